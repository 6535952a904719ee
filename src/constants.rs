//! Constants used throughout the application

/// Number of landmarks in one detected hand skeleton
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Values per landmark in the model output (x, y, z)
pub const LANDMARK_COORDS: usize = 3;

/// Default distance above which a fingertip counts as spread away from the thumb
pub const DEFAULT_EXTENDED_MIN: f32 = 0.2;

/// Default distance below which a fingertip counts as touching the thumb
pub const DEFAULT_TOGETHER_MAX: f32 = 0.1;

/// Default capture device index
pub const DEFAULT_CAMERA_INDEX: i32 = 0;

/// Default interval between interactive frame iterations
pub const DEFAULT_REFRESH_MS: u64 = 10;

/// Number of hands tracked at once
pub const MAX_TRACKED_HANDS: usize = 1;

/// Default hand landmark model input size
pub const DEFAULT_LANDMARK_INPUT_SIZE: i32 = 224;

/// Default minimum hand presence score
pub const DEFAULT_MIN_HAND_CONFIDENCE: f32 = 0.5;

/// Default log directory and file name
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const LOG_FILE_NAME: &str = "makaton_app.log";

/// Log rotation limits
pub const LOG_MAX_BYTES: u64 = 1_000_000;
pub const LOG_BACKUP_COUNT: usize = 3;

/// Frames used by the benchmark and the diagnostics smoke test
pub const DEFAULT_BENCHMARK_FRAMES: usize = 200;
pub const DEFAULT_SMOKE_TEST_FRAMES: usize = 50;

/// Upper bound on how long stopping the worker may block
pub const WORKER_SHUTDOWN_TIMEOUT_MS: u64 = 2000;

/// Entries visible in the on-screen gesture log
pub const GESTURE_LOG_CAPACITY: usize = 10;

/// Oldest toolchain the diagnostics accept
pub const MIN_RUSTC_VERSION: (u32, u32) = (1, 70);
