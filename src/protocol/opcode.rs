//! Assigned operation codes.
//!
//! Configuration opcodes are secured with the device key by the lower
//! transport; application opcodes with an application key. Single-octet
//! values encode as one byte on the wire, `0x8xxx` values as two.

// Configuration messages
pub const CONFIG_APP_KEY_ADD: u32 = 0x00;
pub const CONFIG_APP_KEY_STATUS: u32 = 0x8003;
pub const CONFIG_COMPOSITION_DATA_GET: u32 = 0x8008;
pub const CONFIG_COMPOSITION_DATA_STATUS: u32 = 0x02;
pub const CONFIG_MODEL_PUBLICATION_SET: u32 = 0x03;
pub const CONFIG_MODEL_PUBLICATION_STATUS: u32 = 0x8019;
pub const CONFIG_MODEL_SUBSCRIPTION_ADD: u32 = 0x801B;
pub const CONFIG_MODEL_SUBSCRIPTION_DELETE: u32 = 0x801C;
pub const CONFIG_MODEL_SUBSCRIPTION_STATUS: u32 = 0x801F;
pub const CONFIG_NETWORK_TRANSMIT_GET: u32 = 0x8023;
pub const CONFIG_NETWORK_TRANSMIT_SET: u32 = 0x8024;
pub const CONFIG_NETWORK_TRANSMIT_STATUS: u32 = 0x8025;
pub const CONFIG_RELAY_GET: u32 = 0x8026;
pub const CONFIG_RELAY_SET: u32 = 0x8027;
pub const CONFIG_RELAY_STATUS: u32 = 0x8028;
pub const CONFIG_MODEL_APP_BIND: u32 = 0x803D;
pub const CONFIG_MODEL_APP_STATUS: u32 = 0x803E;
pub const CONFIG_MODEL_APP_UNBIND: u32 = 0x803F;
pub const CONFIG_NODE_RESET: u32 = 0x8049;
pub const CONFIG_NODE_RESET_STATUS: u32 = 0x804A;

// Generic model messages
pub const GENERIC_ON_OFF_GET: u32 = 0x8201;
pub const GENERIC_ON_OFF_SET: u32 = 0x8202;
pub const GENERIC_ON_OFF_SET_UNACKNOWLEDGED: u32 = 0x8203;
pub const GENERIC_ON_OFF_STATUS: u32 = 0x8204;
pub const GENERIC_LEVEL_GET: u32 = 0x8205;
pub const GENERIC_LEVEL_SET: u32 = 0x8206;
pub const GENERIC_LEVEL_SET_UNACKNOWLEDGED: u32 = 0x8207;
pub const GENERIC_LEVEL_STATUS: u32 = 0x8208;
pub const GENERIC_DEFAULT_TRANSITION_TIME_GET: u32 = 0x820D;
pub const GENERIC_DEFAULT_TRANSITION_TIME_SET: u32 = 0x820E;
pub const GENERIC_DEFAULT_TRANSITION_TIME_STATUS: u32 = 0x8210;

// Time messages
pub const TIME_SET: u32 = 0x5C;
pub const TIME_STATUS: u32 = 0x5D;
pub const TIME_GET: u32 = 0x8237;

// Scene messages
pub const SCENE_STATUS: u32 = 0x5E;
pub const SCENE_GET: u32 = 0x8241;
pub const SCENE_RECALL: u32 = 0x8242;
pub const SCENE_RECALL_UNACKNOWLEDGED: u32 = 0x8243;
pub const SCENE_REGISTER_GET: u32 = 0x8244;
pub const SCENE_REGISTER_STATUS: u32 = 0x8245;
pub const SCENE_STORE: u32 = 0x8246;
pub const SCENE_STORE_UNACKNOWLEDGED: u32 = 0x8247;
pub const SCENE_DELETE: u32 = 0x829E;
pub const SCENE_DELETE_UNACKNOWLEDGED: u32 = 0x829F;

// Scheduler messages
pub const SCHEDULER_GET: u32 = 0x8249;
pub const SCHEDULER_STATUS: u32 = 0x824A;

// Lighting model messages
pub const LIGHT_LIGHTNESS_GET: u32 = 0x824B;
pub const LIGHT_LIGHTNESS_SET: u32 = 0x824C;
pub const LIGHT_LIGHTNESS_SET_UNACKNOWLEDGED: u32 = 0x824D;
pub const LIGHT_LIGHTNESS_STATUS: u32 = 0x824E;
pub const LIGHT_CTL_GET: u32 = 0x825D;
pub const LIGHT_CTL_SET: u32 = 0x825E;
pub const LIGHT_CTL_SET_UNACKNOWLEDGED: u32 = 0x825F;
pub const LIGHT_CTL_STATUS: u32 = 0x8260;
pub const LIGHT_HSL_GET: u32 = 0x826D;
pub const LIGHT_HSL_SET: u32 = 0x8276;
pub const LIGHT_HSL_SET_UNACKNOWLEDGED: u32 = 0x8277;
pub const LIGHT_HSL_STATUS: u32 = 0x8278;
