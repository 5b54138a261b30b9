/// Vulkan debug messenger - routes validation layer messages into the candid logger
///
/// Messages are counted per severity so that tests and tools can check a run
/// finished without validation errors.

use ash::vk;
use candid_core::candid::log::{self, LogSeverity};
use candid_core::{candid_info, candid_warn};
use std::ffi::CStr;
use std::sync::atomic::{AtomicU32, Ordering};

const SOURCE: &str = "candid::vulkan::validation";

// Message counters indexed by `bucket()`: errors, warnings, info, verbose
static COUNTERS: [AtomicU32; 4] = [AtomicU32::new(0), AtomicU32::new(0), AtomicU32::new(0), AtomicU32::new(0)];

/// Snapshot of validation message counts since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

fn bucket(severity: LogSeverity) -> usize {
    match severity {
        LogSeverity::Error => 0,
        LogSeverity::Warn => 1,
        LogSeverity::Info => 2,
        LogSeverity::Debug | LogSeverity::Trace => 3,
    }
}

fn count_message(severity: LogSeverity) {
    COUNTERS[bucket(severity)].fetch_add(1, Ordering::Relaxed);
}

pub fn get_validation_stats() -> ValidationStats {
    let [errors, warnings, info, verbose] = COUNTERS.each_ref().map(|counter| counter.load(Ordering::Relaxed));
    ValidationStats { errors, warnings, info, verbose }
}

pub fn reset_validation_stats() {
    for counter in &COUNTERS {
        counter.store(0, Ordering::Relaxed);
    }
}

/// Log a one-line summary of the validation messages seen so far
///
/// Logged at WARN when any validation error was reported, INFO otherwise.
pub fn log_validation_summary() {
    let stats = get_validation_stats();
    let summary = format!(
        "Validation summary: {} errors, {} warnings, {} info, {} verbose",
        stats.errors, stats.warnings, stats.info, stats.verbose
    );
    if stats.errors > 0 {
        candid_warn!(SOURCE, "{}", summary);
    } else {
        candid_info!(SOURCE, "{}", summary);
    }
}

/// Severity flags the messenger subscribes to
pub(crate) fn messenger_severity_flags() -> vk::DebugUtilsMessageSeverityFlagsEXT {
    vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
        | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
        | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
        | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
}

pub(crate) fn message_severity_to_log(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> LogSeverity {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        LogSeverity::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        LogSeverity::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        LogSeverity::Debug
    } else {
        LogSeverity::Trace
    }
}

pub(crate) fn message_type_name(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    }
}

/// Vulkan debug messenger callback
///
/// Always returns `VK_FALSE` so the triggering call is not aborted.
pub(crate) unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }
    let callback_data = &*p_callback_data;
    let message_id_name = if callback_data.p_message_id_name.is_null() {
        "Unknown".into()
    } else {
        CStr::from_ptr(callback_data.p_message_id_name).to_string_lossy()
    };
    let message = if callback_data.p_message.is_null() {
        "No message".into()
    } else {
        CStr::from_ptr(callback_data.p_message).to_string_lossy()
    };

    let severity = message_severity_to_log(message_severity);
    count_message(severity);

    log::log(
        severity,
        SOURCE,
        format!("[{}] {}: {}", message_type_name(message_type), message_id_name, message),
    );

    vk::FALSE
}

#[cfg(test)]
#[path = "debug_tests.rs"]
mod tests;
