pub mod blog_feed;
pub mod fan_data;
pub mod fan_insights;
pub mod forms;
pub mod newsletter;
pub mod tool_catalog;
