use ime_switcher_core::{ConversionMode, ImeState, KeyboardLayoutId, LanguageId, PunctuationMode};
use tracing_test::traced_test;

use super::fakes::{Command, Harness, WINDOW, fast_settings, snapshot};
use crate::domain::{
    outcome::{ActionOutcome, Failure},
    ports::ForegroundSnapshot,
};

#[test]
fn toggle_from_english_activates_secondary_layout() {
    let h = Harness::english();

    assert_eq!(h.engine.toggle(), ActionOutcome::Applied);
    assert_eq!(
        h.commander.commands(),
        vec![Command::Layout(WINDOW, "00000804".parse().unwrap())]
    );
}

#[test]
fn toggle_from_secondary_language_activates_primary() {
    let h = Harness::new(
        snapshot(0x0804_0804, ImeState::CLOSED),
        fast_settings(KeyboardLayoutId::CHINESE_SIMPLIFIED),
    );

    h.engine.toggle();
    assert_eq!(h.commander.layouts(), vec![KeyboardLayoutId::ENGLISH_US]);
}

#[test]
fn toggle_from_third_language_goes_to_secondary() {
    let h = Harness::new(
        snapshot(0x0419_0419, ImeState::CLOSED),
        fast_settings(KeyboardLayoutId::CHINESE_SIMPLIFIED),
    );

    h.engine.toggle();
    assert_eq!(h.commander.layouts(), vec![KeyboardLayoutId::CHINESE_SIMPLIFIED]);
}

#[test]
fn consecutive_toggles_alternate() {
    let h = Harness::english();

    h.engine.toggle();
    h.engine.toggle();
    h.engine.toggle();

    assert_eq!(
        h.commander.layouts(),
        vec![
            KeyboardLayoutId::CHINESE_SIMPLIFIED,
            KeyboardLayoutId::ENGLISH_US,
            KeyboardLayoutId::CHINESE_SIMPLIFIED,
        ]
    );
}

#[test]
fn switch_primary_and_secondary_are_unconditional() {
    let h = Harness::english();

    h.engine.switch_primary();
    h.engine.switch_primary();
    h.engine.switch_secondary();
    h.engine.switch_secondary();

    assert_eq!(
        h.commander.layouts(),
        vec![
            KeyboardLayoutId::ENGLISH_US,
            KeyboardLayoutId::ENGLISH_US,
            KeyboardLayoutId::CHINESE_SIMPLIFIED,
            KeyboardLayoutId::CHINESE_SIMPLIFIED,
        ]
    );
}

#[traced_test]
#[test]
fn rejected_layout_is_reported_not_fatal() {
    let h = Harness::english();
    h.commander.fail_all(true);

    assert_eq!(h.engine.toggle(), ActionOutcome::Failed(Failure::LayoutError));
    assert!(logs_contain("layout switch failed"));

    h.commander.fail_all(false);
    assert_eq!(h.engine.toggle(), ActionOutcome::Applied);
}

#[test]
fn unknown_foreground_window_still_issues_one_command() {
    let h = Harness::new(
        ForegroundSnapshot::unknown(),
        fast_settings(KeyboardLayoutId::CHINESE_SIMPLIFIED),
    );

    h.engine.toggle();
    assert_eq!(h.commander.layouts(), vec![KeyboardLayoutId::CHINESE_SIMPLIFIED]);
}

#[test]
fn status_reports_derived_ime_mode() {
    let h = Harness::new(
        snapshot(
            0x0804_0804,
            ImeState {
                is_open: true,
                conversion: ConversionMode::NATIVE | ConversionMode::SYMBOL,
            },
        ),
        fast_settings(KeyboardLayoutId::CHINESE_SIMPLIFIED),
    );

    let status = h.engine.status();
    assert_eq!(status.title, "Notepad");
    assert_eq!(status.language, LanguageId::CHINESE_SIMPLIFIED);
    assert!(status.is_candidate);
    assert!(status.native);
    assert_eq!(status.punctuation, PunctuationMode::NativeSymbols);
    assert!(status.auto_correct);
    assert!(!status.session_active);
}

#[test]
fn status_ignores_stale_open_flag_on_primary_language() {
    let h = Harness::new(
        snapshot(
            0x0409_0409,
            ImeState {
                is_open: true,
                conversion: ConversionMode::NATIVE,
            },
        ),
        fast_settings(KeyboardLayoutId::CHINESE_SIMPLIFIED),
    );

    let status = h.engine.status();
    assert!(!status.native);
    assert!(!status.is_candidate);
}

#[traced_test]
#[test]
fn status_uses_placeholder_title_without_foreground_window() {
    let h = Harness::new(
        ForegroundSnapshot::unknown(),
        fast_settings(KeyboardLayoutId::CHINESE_SIMPLIFIED),
    );

    assert_eq!(h.engine.status().title, "[Unknown]");
    h.engine.log_status();
    assert!(logs_contain("[Unknown]"));
}
