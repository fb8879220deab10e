mod server;

pub use server::{AppState, ChatRequest, ChatResponse, ResetRequest, ResetResponse, run};
