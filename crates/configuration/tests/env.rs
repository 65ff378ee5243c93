//! Kept in its own test binary: it mutates the process environment.

use configuration::load_settings;

#[test]
fn environment_overrides_list_and_scalar_keys() {
    // SAFETY: the only test in this binary, so no other thread reads the environment.
    unsafe {
        std::env::set_var("CRYPTOLENS__INDICATORS__MA_WINDOWS", "10,50");
        std::env::set_var("CRYPTOLENS__INDICATORS__RSI_WINDOW", "21");
    }

    let settings = load_settings().unwrap();
    assert_eq!(settings.indicators.ma_windows, vec![10, 50]);
    assert_eq!(settings.indicators.rsi_window, 21);
}
