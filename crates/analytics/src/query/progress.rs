//! Optional progress side-channel for long-running queries.

/// Wraps an optional `(percent, message)` callback. The default reports
/// nowhere, so engine code can report unconditionally.
#[derive(Default)]
pub struct Progress<'a> {
    callback: Option<&'a mut dyn FnMut(u8, &str)>,
}

impl<'a> Progress<'a> {
    pub fn none() -> Self {
        Self { callback: None }
    }

    pub fn new(callback: &'a mut dyn FnMut(u8, &str)) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn report(&mut self, percent: u8, message: &str) {
        if let Some(cb) = self.callback.as_mut() {
            cb(percent.min(100), message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_silent() {
        let mut p = Progress::none();
        p.report(50, "halfway");
    }

    #[test]
    fn callback_receives_clamped_percent() {
        let mut seen = Vec::new();
        let mut cb = |pct: u8, msg: &str| seen.push((pct, msg.to_owned()));
        let mut p = Progress::new(&mut cb);
        p.report(10, "start");
        p.report(250, "overflow");
        drop(p);
        assert_eq!(seen, vec![(10, "start".to_owned()), (100, "overflow".to_owned())]);
    }
}
