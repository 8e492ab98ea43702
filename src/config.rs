// src/config.rs
use std::env;
use std::path::PathBuf;

/// Company identity printed on receipt documents.
#[derive(Debug, Clone)]
pub struct CompanyInfo {
    pub name: String,
    pub cnpj: String,
    pub address: String,
    pub city: String,
    pub phone: String,
}

/// Environment-derived configuration for document composition.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub company: CompanyInfo,
    /// Static warranty terms PDF appended to every receipt document.
    pub warranty_terms_path: PathBuf,
    /// Optional logo used as header image and page watermark.
    pub logo_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            company: CompanyInfo {
                name: env::var("COMPANY_NAME")
                    .unwrap_or_else(|_| "Storefront Eletronicos".to_string()),
                cnpj: env::var("COMPANY_CNPJ").unwrap_or_else(|_| "00.000.000/0000-00".to_string()),
                address: env::var("COMPANY_ADDRESS").unwrap_or_else(|_| "".to_string()),
                city: env::var("COMPANY_CITY").unwrap_or_else(|_| "".to_string()),
                phone: env::var("COMPANY_PHONE").unwrap_or_else(|_| "".to_string()),
            },
            warranty_terms_path: env::var("WARRANTY_TERMS_PATH")
                .unwrap_or_else(|_| "assets/warranty-terms.pdf".to_string())
                .into(),
            logo_path: env::var("COMPANY_LOGO_PATH").ok().map(PathBuf::from),
        }
    }
}
