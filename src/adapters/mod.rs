// Adapters layer: concrete implementations for external systems (storage, model endpoints).

pub mod http_model;
pub mod storage;
