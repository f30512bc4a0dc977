pub mod extraction;
pub mod structuring;
pub mod drafting;
pub mod rendering;
pub mod storage;
pub mod processor;
