pub mod exporter;
pub mod raster;
pub mod renderer;

pub use exporter::{
    CancelToken, ExportError, ExportOptions, ExportSession, PrintJob, RenderedLabel, ZipReport,
    LABELS_PER_PAGE, MAX_COPIES,
};
pub use raster::{PngRasterizer, Rasterizer};
pub use renderer::{render, LabelDocument, QrMatrix, RenderError};
