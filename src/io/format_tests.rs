use crate::io::format::ProgressBar;

#[test]
fn test_format_progress_bar_running() {
    let mut sink = Vec::new();
    let mut bar = ProgressBar::with_sink(10, &mut sink);
    bar.set(4);
    bar.put(1).unwrap();
    bar.put(2).unwrap();
    let drawn = String::from_utf8(sink).unwrap();
    assert_eq!(drawn, "[##--------]  25%\r[#####-----]  50%\r");
}

#[test]
fn test_format_progress_bar_completion() {
    let mut sink = Vec::new();
    let mut bar = ProgressBar::with_sink(8, &mut sink);
    bar.set(2);
    bar.put(2).unwrap();
    let drawn = String::from_utf8(sink).unwrap();
    assert_eq!(drawn, "[########] 100%\n");
}

#[test]
fn test_format_progress_bar_overshoot_clamps() {
    let mut sink = Vec::new();
    let mut bar = ProgressBar::with_sink(4, &mut sink);
    bar.set(3);
    bar.put(7).unwrap();
    let drawn = String::from_utf8(sink).unwrap();
    assert_eq!(drawn, "[####] 100%\n");
}
