use super::*;
use serial_test::serial;

#[test]
fn test_message_severity_mapping() {
    assert_eq!(
        message_severity_to_log(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR),
        LogSeverity::Error
    );
    assert_eq!(
        message_severity_to_log(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING),
        LogSeverity::Warn
    );
    assert_eq!(
        message_severity_to_log(vk::DebugUtilsMessageSeverityFlagsEXT::INFO),
        LogSeverity::Debug
    );
    assert_eq!(
        message_severity_to_log(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE),
        LogSeverity::Trace
    );
    assert!(messenger_severity_flags().contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR));
}

#[test]
fn test_message_type_names() {
    assert_eq!(message_type_name(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION), "Validation");
    assert_eq!(message_type_name(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE), "Performance");
    assert_eq!(message_type_name(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL), "General");
}

#[test]
fn test_stats_total() {
    let stats = ValidationStats { errors: 1, warnings: 2, info: 3, verbose: 4 };
    assert_eq!(stats.total(), 10);
    assert_eq!(ValidationStats::default().total(), 0);
}

#[test]
#[serial]
fn test_counters_follow_log_severity() {
    reset_validation_stats();
    count_message(LogSeverity::Error);
    count_message(LogSeverity::Warn);
    count_message(LogSeverity::Warn);
    count_message(LogSeverity::Trace);
    count_message(LogSeverity::Debug);

    let stats = get_validation_stats();
    assert_eq!(stats, ValidationStats { errors: 1, warnings: 2, info: 0, verbose: 2 });

    reset_validation_stats();
    assert_eq!(get_validation_stats().total(), 0);
}
