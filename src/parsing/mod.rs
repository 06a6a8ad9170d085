//! 响应解析
//!
//! - `segmenter` - 按标题把一次生成的文本切成命名字段
//! - `distractor` - 从错误选项分析段落中截取每个选项的说明
//!
//! 两者都不会因为模型输出格式不符而报错，缺失的部分一律用兜底文本填充。

pub mod distractor;
pub mod segmenter;

pub use distractor::DistractorResolver;
pub use segmenter::{HeadingLayout, SegmentStatus, Segmenter, Segments};
