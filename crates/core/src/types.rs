/// Discrete frame position inside the loaded video.
pub type FrameIndex = u64;

/// Frames per second assumed for every time/frame conversion.
pub type FrameRate = u32;
