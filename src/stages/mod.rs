pub mod stage0_normalize;
pub mod stage1_generate;
pub mod stage2_extract;
pub mod stage3_classify;
pub mod stage4_report;

pub use stage0_normalize::*;
pub use stage1_generate::*;
pub use stage2_extract::*;
pub use stage3_classify::*;
pub use stage4_report::*;
