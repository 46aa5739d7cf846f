// Human3.6M action classes, in the order used for one-hot encoding
pub const ACTIONS: [&str; 15] = [
    "walking",
    "eating",
    "smoking",
    "discussion",
    "directions",
    "greeting",
    "phoning",
    "posing",
    "purchases",
    "sitting",
    "sittingdown",
    "takingphoto",
    "waiting",
    "walkingdog",
    "walkingtogether",
];

// actions evaluated in the SRNN protocol
pub const SRNN_ACTIONS: [&str; 4] = ["walking", "eating", "smoking", "discussion"];

// subjects
pub const TRAIN_SUBJECTS: [usize; 6] = [1, 6, 7, 8, 9, 11];
pub const TEST_SUBJECT: usize = 5;
pub const SUBACTIONS: [usize; 2] = [1, 2];

// pose layout: root position followed by 32 exponential maps
pub const POSE_DIM: usize = 99;
pub const JOINT_BEGIN: usize = 3;
pub const JOINT_END: usize = 97;
pub const EXPMAP_SIZE: usize = 3;

// sequence lengths used at evaluation time
pub const SOURCE_SEQ_LEN: usize = 50;
pub const TARGET_SEQ_LEN: usize = 100;

// SRNN seed selection
pub const SRNN_SEED: u32 = 1234567890;
pub const SRNN_BATCH_SIZE: usize = 8;
pub const SRNN_MIN_OFFSET: usize = 16;

// dimensions whose std falls below this are treated as constant
pub const STD_EPSILON: f64 = 1e-4;

// 25 fps after dropping every other frame
pub const FRAME_MILLIS: usize = 40;
pub const SUMMARY_HORIZONS_MS: [usize; 6] = [80, 160, 320, 400, 560, 1000];
