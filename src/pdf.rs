// src/pdf.rs
//! Receipt document composer.
//!
//! Renders the receipt pages with printpdf (header, customer block, item
//! table with continuation pages, payment and warranty blocks, signature
//! lines), then appends every page of the static warranty-terms PDF. The
//! company logo is optional and degrades to a text-only layout; the
//! warranty terms are mandatory and abort the composition when missing.

use std::collections::BTreeMap;
use std::io::BufWriter;

use chrono::NaiveDate;
use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};

use crate::config::CompanyInfo;
use crate::error::AppError;
use crate::format::{format_currency, format_date};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 195.0;
const TOP_Y: f32 = 285.0;
const BOTTOM_Y: f32 = 25.0;

pub struct DocumentItem {
    pub name: String,
    pub imei: Option<String>,
    pub quantity: i32,
    pub price: f64,
}

pub struct ReceiptDocumentData {
    pub receipt_number: i64,
    pub customer_name: String,
    pub customer_cpf: Option<String>,
    pub employee_name: String,
    pub issued_on: NaiveDate,
    pub payment_method_label: String,
    pub installments: i32,
    pub installment_value: f64,
    pub total_amount: f64,
    pub warranty_duration_months: Option<i32>,
    pub warranty_expires_at: Option<NaiveDate>,
    pub items: Vec<DocumentItem>,
}

/// Renders the receipt and appends the warranty terms, returning the final
/// downloadable PDF bytes.
pub fn compose_receipt_document(
    data: &ReceiptDocumentData,
    company: &CompanyInfo,
    logo_bytes: Option<&[u8]>,
    warranty_terms: &[u8],
) -> Result<Vec<u8>, AppError> {
    let receipt_bytes = render_receipt_pages(data, company, logo_bytes)?;
    append_warranty_terms(&receipt_bytes, warranty_terms)
}

/// Deterministic download name: `receipt <customer> <dd-mm-yyyy>.pdf`.
pub fn document_file_name(customer_name: &str, issued_on: NaiveDate) -> String {
    sanitize_filename(&format!(
        "receipt {} {}.pdf",
        customer_name,
        issued_on.format("%d-%m-%Y")
    ))
}

fn sanitize_filename(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' || ch == ' ';
        out.push(if ok { ch } else { '_' });
    }
    let trimmed = out.trim().to_string();
    if trimmed.is_empty() {
        "receipt.pdf".to_string()
    } else {
        trimmed
    }
}

struct PageComposer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    font_italic: IndirectFontRef,
    y: f32,
}

impl PageComposer {
    fn new(title: &str) -> Result<Self, AppError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);

        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::document(format!("Failed to load document font: {e}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::document(format!("Failed to load document font: {e}")))?;
        let font_italic = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| AppError::document(format!("Failed to load document font: {e}")))?;

        Ok(Self {
            doc,
            layer,
            font,
            font_bold,
            font_italic,
            y: TOP_Y,
        })
    }

    /// Starts a continuation page when fewer than `needed` millimeters
    /// remain above the bottom margin.
    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed < BOTTOM_Y {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP_Y;
        }
    }

    fn text(&self, text: &str, size: f32, x: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), &self.font);
    }

    fn text_bold(&self, text: &str, size: f32, x: f32) {
        self.layer
            .use_text(text, size, Mm(x), Mm(self.y), &self.font_bold);
    }

    fn text_italic(&self, text: &str, size: f32, x: f32) {
        self.layer
            .use_text(text, size, Mm(x), Mm(self.y), &self.font_italic);
    }

    fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }

    fn divider(&self) {
        self.horizontal_line(MARGIN_LEFT, MARGIN_RIGHT, self.y);
    }

    fn horizontal_line(&self, x1: f32, x2: f32, y: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(y)), false),
                (Point::new(Mm(x2), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn into_bytes(self) -> Result<Vec<u8>, AppError> {
        let mut writer = BufWriter::new(Vec::<u8>::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| AppError::document(format!("Failed to write receipt document: {e}")))?;
        writer
            .into_inner()
            .map_err(|e| AppError::document(format!("Failed to write receipt document: {e}")))
    }
}

fn decode_logo(logo_bytes: Option<&[u8]>) -> Option<DynamicImage> {
    let bytes = logo_bytes?;
    match image_crate::load_from_memory(bytes) {
        Ok(img) => Some(img),
        Err(e) => {
            tracing::warn!(?e, "Failed to decode company logo, using text-only layout");
            None
        }
    }
}

// printpdf has no layer alpha; fade the raster toward white instead so the
// watermark stays behind the text visually.
fn fade_for_watermark(img: &DynamicImage) -> DynamicImage {
    let mut rgb = img.to_rgb8();
    for px in rgb.pixels_mut() {
        for c in 0..3 {
            px[c] = 255 - (((255 - px[c] as u16) * 3) / 20) as u8;
        }
    }
    DynamicImage::ImageRgb8(rgb)
}

fn place_image(img: &DynamicImage, layer: &PdfLayerReference, x: f32, y: f32, target_width_mm: f32) {
    let (w, _) = img.dimensions();
    if w == 0 {
        return;
    }
    // images are placed at 300 dpi by default
    let natural_width_mm = w as f32 * 25.4 / 300.0;
    let scale = target_width_mm / natural_width_mm;

    Image::from_dynamic_image(img).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(y)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            ..Default::default()
        },
    );
}

fn render_receipt_pages(
    data: &ReceiptDocumentData,
    company: &CompanyInfo,
    logo_bytes: Option<&[u8]>,
) -> Result<Vec<u8>, AppError> {
    let mut page = PageComposer::new("Sales Receipt")?;

    if let Some(logo) = decode_logo(logo_bytes) {
        let watermark = fade_for_watermark(&logo);
        place_image(&watermark, &page.layer, 45.0, 90.0, 120.0);
        place_image(&logo, &page.layer, 170.0, 264.0, 24.0);
    }

    // Company header
    page.text_bold(&company.name, 16.0, MARGIN_LEFT);
    page.advance(7.0);
    page.text(&format!("CNPJ: {}", company.cnpj), 10.0, MARGIN_LEFT);
    page.advance(5.0);
    page.text(&company.address, 10.0, MARGIN_LEFT);
    page.advance(5.0);
    page.text(&company.city, 10.0, MARGIN_LEFT);
    page.advance(5.0);
    page.text(&format!("Phone: {}", company.phone), 10.0, MARGIN_LEFT);
    page.advance(10.0);
    page.divider();
    page.advance(10.0);

    page.text_bold("SALES RECEIPT", 16.0, MARGIN_LEFT);
    page.advance(10.0);

    // Customer and sale details
    let customer_line = match &data.customer_cpf {
        Some(cpf) => format!("Customer: {} (CPF {})", data.customer_name, cpf),
        None => format!("Customer: {}", data.customer_name),
    };
    page.text(&customer_line, 12.0, MARGIN_LEFT);
    page.advance(7.0);
    page.text(&format!("Date: {}", format_date(data.issued_on)), 12.0, MARGIN_LEFT);
    page.advance(7.0);
    page.text(&format!("Receipt No: {}", data.receipt_number), 12.0, MARGIN_LEFT);
    page.advance(7.0);
    page.text(&format!("Seller: {}", data.employee_name), 12.0, MARGIN_LEFT);
    page.advance(12.0);

    // Item table
    let x_item = MARGIN_LEFT;
    let x_imei = 85.0;
    let x_qty = 130.0;
    let x_price = 145.0;
    let x_total = 172.0;

    page.text_bold("Item", 10.0, x_item);
    page.text_bold("IMEI", 10.0, x_imei);
    page.text_bold("Qty", 10.0, x_qty);
    page.text_bold("Price", 10.0, x_price);
    page.text_bold("Total", 10.0, x_total);
    page.advance(3.5);
    page.divider();
    page.advance(6.0);

    for item in &data.items {
        page.ensure_space(8.0);
        let name: String = item.name.chars().take(38).collect();
        page.text(&name, 10.0, x_item);
        page.text(item.imei.as_deref().unwrap_or("-"), 10.0, x_imei);
        page.text(&item.quantity.to_string(), 10.0, x_qty);
        page.text(&format_currency(item.price), 10.0, x_price);
        page.text(
            &format_currency(item.price * item.quantity as f64),
            10.0,
            x_total,
        );
        page.advance(6.0);
    }

    page.ensure_space(30.0);
    page.divider();
    page.advance(8.0);

    // Payment terms
    page.text_bold(
        &format!("Payment method: {}", data.payment_method_label),
        11.0,
        MARGIN_LEFT,
    );
    page.advance(7.0);
    if data.installments > 1 {
        page.text_bold(
            &format!(
                "Installments: {}x of {}",
                data.installments,
                format_currency(data.installment_value)
            ),
            11.0,
            MARGIN_LEFT,
        );
        page.advance(7.0);
    }
    page.text_bold(
        &format!("Total amount: {}", format_currency(data.total_amount)),
        12.0,
        MARGIN_LEFT,
    );
    page.advance(12.0);

    // Warranty block
    if let Some(months) = data.warranty_duration_months.filter(|m| *m > 0) {
        page.ensure_space(30.0);
        page.text_bold("Warranty", 13.0, MARGIN_LEFT);
        page.advance(7.0);
        page.text(&format!("Duration: {} months", months), 11.0, MARGIN_LEFT);
        page.advance(6.0);
        if let Some(expires) = data.warranty_expires_at {
            page.text(
                &format!("Valid until: {}", format_date(expires)),
                11.0,
                MARGIN_LEFT,
            );
            page.advance(6.0);
        }
        page.advance(6.0);
    }

    // Signature lines
    page.ensure_space(40.0);
    page.advance(14.0);
    page.text_italic(&company.name, 10.0, 32.0);
    page.advance(4.0);
    page.horizontal_line(25.0, 95.0, page.y);
    page.horizontal_line(115.0, 185.0, page.y);
    page.advance(6.0);
    page.text("Seller signature", 10.0, 38.0);
    page.text("Customer signature", 10.0, 127.0);

    // Footer on the last page
    let thanks = format!("Thank you for choosing {}!", company.name);
    page.layer
        .use_text(thanks, 9.0, Mm(MARGIN_LEFT), Mm(16.0), &page.font);
    if !company.phone.is_empty() {
        page.layer.use_text(
            format!("Questions? Contact us: {}", company.phone),
            9.0,
            Mm(MARGIN_LEFT),
            Mm(11.0),
            &page.font,
        );
    }

    page.into_bytes()
}

/// Appends every page of the warranty terms PDF after the receipt pages.
fn append_warranty_terms(receipt_bytes: &[u8], terms_bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let receipt = lopdf::Document::load_mem(receipt_bytes)
        .map_err(|e| AppError::document(format!("Failed to reload receipt pages: {e}")))?;
    let terms = lopdf::Document::load_mem(terms_bytes)
        .map_err(|e| AppError::document(format!("Failed to parse warranty terms document: {e}")))?;

    if terms.get_pages().is_empty() {
        return Err(AppError::document("Warranty terms document has no pages"));
    }

    merge_documents(vec![receipt, terms])
}

// Standard lopdf merge: renumber both documents into one id space, collect
// their page objects under a single Pages node and rebuild the catalog.
fn merge_documents(documents: Vec<lopdf::Document>) -> Result<Vec<u8>, AppError> {
    use lopdf::{Document, Object, ObjectId};

    let mut max_id = 1;
    let mut documents_pages: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut documents_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, object_id) in doc.get_pages() {
            if let Ok(object) = doc.get_object(object_id) {
                documents_pages.insert(object_id, object.to_owned());
            }
        }
        documents_objects.extend(doc.objects.clone());
    }

    let mut document = Document::with_version("1.5");
    let mut catalog_object: Option<(ObjectId, Object)> = None;
    let mut pages_object: Option<(ObjectId, Object)> = None;

    for (object_id, object) in documents_objects.iter() {
        let type_name: Option<&[u8]> = object
            .as_dict()
            .ok()
            .and_then(|d| d.get(b"Type").ok())
            .and_then(|t| t.as_name().ok());

        if type_name == Some(b"Catalog".as_slice()) {
            // keep the first catalog seen
            if catalog_object.is_none() {
                catalog_object = Some((*object_id, object.clone()));
            }
        } else if type_name == Some(b"Pages".as_slice()) {
            if let Ok(dictionary) = object.as_dict() {
                let mut dictionary = dictionary.clone();
                if let Some((_, ref existing)) = pages_object {
                    if let Ok(existing_dict) = existing.as_dict() {
                        dictionary.extend(&existing_dict.clone());
                    }
                }
                let id = pages_object
                    .as_ref()
                    .map(|(id, _)| *id)
                    .unwrap_or(*object_id);
                pages_object = Some((id, Object::Dictionary(dictionary)));
            }
        } else if type_name == Some(b"Page".as_slice())
            || type_name == Some(b"Outlines".as_slice())
        {
            // pages are re-attached below; outlines are dropped
        } else {
            document.objects.insert(*object_id, object.clone());
        }
    }

    let (pages_id, pages_root) = pages_object
        .ok_or_else(|| AppError::document("No Pages tree found while merging documents"))?;
    let (catalog_id, catalog_root) = catalog_object
        .ok_or_else(|| AppError::document("No Catalog found while merging documents"))?;

    for (object_id, object) in documents_pages.iter() {
        if let Ok(dictionary) = object.as_dict() {
            let mut dictionary = dictionary.clone();
            dictionary.set("Parent", pages_id);
            document
                .objects
                .insert(*object_id, Object::Dictionary(dictionary));
        }
    }

    if let Ok(dictionary) = pages_root.as_dict() {
        let mut dictionary = dictionary.clone();
        dictionary.set("Count", documents_pages.len() as u32);
        dictionary.set(
            "Kids",
            documents_pages
                .keys()
                .map(|id| Object::Reference(*id))
                .collect::<Vec<_>>(),
        );
        document
            .objects
            .insert(pages_id, Object::Dictionary(dictionary));
    }

    if let Ok(dictionary) = catalog_root.as_dict() {
        let mut dictionary = dictionary.clone();
        dictionary.set("Pages", pages_id);
        dictionary.remove(b"Outlines");
        document
            .objects
            .insert(catalog_id, Object::Dictionary(dictionary));
    }

    document.trailer.set("Root", catalog_id);
    document.max_id = document.objects.len() as u32;
    document.renumber_objects();
    document.compress();

    let mut bytes = Vec::new();
    document
        .save_to(&mut bytes)
        .map_err(|e| AppError::document(format!("Failed to write merged document: {e}")))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_company() -> CompanyInfo {
        CompanyInfo {
            name: "Storefront Eletronicos".to_string(),
            cnpj: "12.345.678/0001-90".to_string(),
            address: "Rua das Flores, 100".to_string(),
            city: "Sao Paulo - SP".to_string(),
            phone: "(11) 90000-0000".to_string(),
        }
    }

    fn sample_data(item_count: usize) -> ReceiptDocumentData {
        ReceiptDocumentData {
            receipt_number: 42,
            customer_name: "Ana Souza".to_string(),
            customer_cpf: Some("123.456.789-09".to_string()),
            employee_name: "Carlos Lima".to_string(),
            issued_on: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            payment_method_label: "PIX".to_string(),
            installments: 3,
            installment_value: 100.0,
            total_amount: 300.0,
            warranty_duration_months: Some(12),
            warranty_expires_at: NaiveDate::from_ymd_opt(2025, 3, 5),
            items: (0..item_count)
                .map(|i| DocumentItem {
                    name: format!("Handset model {}", i),
                    imei: Some("123456-78-901234-5".to_string()),
                    quantity: 1,
                    price: 100.0,
                })
                .collect(),
        }
    }

    fn terms_pdf() -> Vec<u8> {
        let (doc, page, layer) =
            PdfDocument::new("Warranty Terms", Mm(210.0), Mm(297.0), "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).unwrap();
        doc.get_page(page)
            .get_layer(layer)
            .use_text("Warranty terms", 12.0, Mm(15.0), Mm(280.0), &font);
        let mut writer = BufWriter::new(Vec::<u8>::new());
        doc.save(&mut writer).unwrap();
        writer.into_inner().unwrap()
    }

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn composes_receipt_with_terms_appended() {
        let bytes =
            compose_receipt_document(&sample_data(2), &sample_company(), None, &terms_pdf())
                .unwrap();

        assert_eq!(&bytes[0..5], b"%PDF-");
        assert_eq!(page_count(&bytes), 2);
    }

    #[test]
    fn long_item_list_paginates() {
        let receipt = render_receipt_pages(&sample_data(60), &sample_company(), None).unwrap();
        assert!(page_count(&receipt) >= 2);

        let merged =
            compose_receipt_document(&sample_data(60), &sample_company(), None, &terms_pdf())
                .unwrap();
        assert_eq!(page_count(&merged), page_count(&receipt) + 1);
    }

    #[test]
    fn invalid_logo_falls_back_to_text_layout() {
        let bytes = compose_receipt_document(
            &sample_data(1),
            &sample_company(),
            Some(b"not an image"),
            &terms_pdf(),
        )
        .unwrap();

        assert_eq!(page_count(&bytes), 2);
    }

    #[test]
    fn unreadable_terms_abort_composition() {
        let result = compose_receipt_document(
            &sample_data(1),
            &sample_company(),
            None,
            b"not a pdf document",
        );

        assert!(result.is_err());
    }

    #[test]
    fn file_name_is_deterministic_and_safe() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            document_file_name("Ana Souza", date),
            "receipt Ana Souza 05-03-2024.pdf"
        );
        assert_eq!(
            document_file_name("Jo/se", date),
            "receipt Jo_se 05-03-2024.pdf"
        );
    }
}
