pub mod classifier;
pub mod server;
pub mod settings;
pub mod torch;
pub mod vision;

/// Fixed constants of the classification pipeline. These must match the
/// transforms the model artifact was trained with.
pub mod config {
    /// Default tracing filter when `RUST_LOG` is unset
    pub const RUST_LOG: &str = "setu=debug,actix_web=info,actix_server=info";

    /// Side length of the square model input
    pub const IMAGE_SIZE: u32 = 224;

    /// Number of color channels fed to the model
    pub const CHANNELS: usize = 3;

    /// Per-channel (R, G, B) mean used for normalization
    pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

    /// Per-channel (R, G, B) standard deviation used for normalization
    pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

    /// Gesture labels, in the order of the model's output indices
    pub const LABELS: [&str; 4] = ["Dhanyabaad", "Ghar", "Ma", "Namaskaar"];

    /// Largest accepted upload for `/transcribe`
    pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

    /// Multipart field that carries the image
    pub const UPLOAD_FIELD: &str = "file";
}

/// Process-level helpers
pub mod util {
    use tracing_subscriber::EnvFilter;

    /// Install the global tracing subscriber. `RUST_LOG` wins over the
    /// built-in default filter.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(super::config::RUST_LOG));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

}
