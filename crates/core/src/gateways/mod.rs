pub mod gradio;

pub use gradio::{GradioConfig, GradioGateway};
