pub mod csv;
pub mod generic;
pub mod json;
pub mod markup;
pub mod office;
pub mod pdf;

pub use csv::CsvFile;
pub use generic::GenericFile;
pub use json::JsonFile;
pub use markup::MarkupFile;
pub use office::{DocxFile, XlsxFile};
pub use pdf::PdfFile;
