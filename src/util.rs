use log::warn;

// Provider numbers arrive as strings; a value that does not parse becomes NaN
// and is rendered as such.
pub fn parse_decimal(raw: Option<&str>, field: &str) -> f64 {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.parse::<f64>().unwrap_or_else(|e| {
            warn!("Field '{}' is not a number ({:?}: {})", field, s, e);
            f64::NAN
        }),
        _ => {
            warn!("Field '{}' missing from quote", field);
            f64::NAN
        }
    }
}

// Absent or empty volume is legitimately unknown; only garbage is worth a warning.
pub fn parse_volume(raw: Option<&str>) -> Option<u64> {
    let s = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match s.parse::<u64>() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Volume is not an integer ({:?}: {})", s, e);
            None
        }
    }
}

/// Display helpers for prices, volumes and day-over-day change
pub mod format {
    pub const UP_ARROW: &str = "▲";
    pub const DOWN_ARROW: &str = "▼";

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ChangeDirection {
        Up,
        Down,
    }

    impl ChangeDirection {
        /// Up only when there is a change string and it carries no minus sign.
        pub fn from_change_percent(change: &str) -> Self {
            if !change.is_empty() && !change.contains('-') {
                ChangeDirection::Up
            } else {
                ChangeDirection::Down
            }
        }

        pub fn arrow(self) -> &'static str {
            match self {
                ChangeDirection::Up => UP_ARROW,
                ChangeDirection::Down => DOWN_ARROW,
            }
        }

        pub fn style(self) -> ChangeStyle {
            match self {
                ChangeDirection::Up => ChangeStyle::Positive,
                ChangeDirection::Down => ChangeStyle::Negative,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ChangeStyle {
        Positive,
        Negative,
    }

    pub fn format_amount(value: f64) -> String {
        format!("{:.2}", value)
    }

    pub fn format_price(value: f64) -> String {
        format!("${}", format_amount(value))
    }

    pub fn format_volume(volume: u64) -> String {
        let digits = volume.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }

    /// Arrow followed by the provider's change string, e.g. `▼ -0.42%`.
    pub fn change_chip(change: &str) -> String {
        let direction = ChangeDirection::from_change_percent(change);
        format!("{} {}", direction.arrow(), change)
    }
}
