mod progress;
mod spinner;

pub use progress::{
    clear_sweep_progress_bar, set_sweep_progress_bar, sweep_progress_bar, ProgressWriterFactory,
};
pub use spinner::CheckSpinner;
