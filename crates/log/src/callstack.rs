//! Call stack capture for ERROR, DEBUG and TRACE entries

use backtrace::Backtrace;

/// Symbol prefixes of frames that belong to the capture machinery or the
/// logger itself.
const SKIPPED_PREFIXES: &[&str] = &[
    "backtrace::",
    "std::backtrace",
    "lab_log::callstack::",
    "lab_log::entry::",
    "lab_log::logger::",
    "lab_log::timing::",
    "lab_log::layer::",
    "<lab_log::layer::",
    "<lab_log::timing::",
];

/// Runtime frames below `main` that carry no information for the reader.
const RUNTIME_MARKERS: &[&str] = &[
    "std::rt::lang_start",
    "std::sys::backtrace::__rust_begin_short_backtrace",
    "std::sys_common::backtrace::__rust_begin_short_backtrace",
    "core::ops::function::FnOnce::call_once",
];

/// Capture the caller's stack, innermost frame first
///
/// Each frame renders as `function (file:line)` or just `function` when no
/// debug info is available.
pub fn capture(max_frames: usize) -> Vec<String> {
    let bt = Backtrace::new();

    bt.frames()
        .iter()
        .filter_map(|frame| {
            let symbol = frame.symbols().first()?;
            let name = symbol.name().map(|n| format!("{n:#}"))?;
            let location = match (symbol.filename(), symbol.lineno()) {
                (Some(file), Some(line)) => format!(" ({}:{line})", file.display()),
                _ => String::new(),
            };
            Some((name, location))
        })
        .skip_while(|(name, _)| SKIPPED_PREFIXES.iter().any(|p| name.starts_with(p)))
        .take_while(|(name, _)| !RUNTIME_MARKERS.iter().any(|m| name.starts_with(m)))
        .take(max_frames)
        .map(|(name, location)| format!("{name}{location}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline(never)]
    fn captured_here() -> Vec<String> {
        capture(64)
    }

    #[test]
    fn test_skips_capture_frames() {
        let frames = captured_here();
        // Symbols may be missing in stripped builds; only check what we got.
        for frame in &frames {
            assert!(!frame.starts_with("backtrace::"), "unexpected frame {frame}");
        }
    }

    #[test]
    fn test_respects_limit() {
        assert!(capture(2).len() <= 2);
        assert!(capture(0).is_empty());
    }
}
