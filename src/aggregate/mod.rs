pub mod daily_frame;
pub mod monthly;
