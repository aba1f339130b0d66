// src/duration_tests.rs

#[cfg(test)]
mod tests {
    use crate::duration::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_accepts_canonical_strings() {
        assert_eq!(to_decimal("08.30").unwrap(), dec!(8.5));
        assert_eq!(to_decimal("00.00").unwrap(), dec!(0));
        assert_eq!(to_decimal("24.00").unwrap(), dec!(24));
        assert_eq!(to_decimal("23.59").unwrap(), dec!(23.98));
    }

    #[test]
    fn parse_accepts_one_digit_segments() {
        // Grammar permits 1-2 digit minutes: "8.5" is 8 hours 5 minutes.
        assert_eq!(to_decimal("8.5").unwrap(), dec!(8.08));
        assert_eq!(to_decimal("1.05").unwrap(), dec!(1.08));
    }

    #[test]
    fn parse_rejects_out_of_range_times() {
        assert!(matches!(
            DurationValue::parse("24.30"),
            Err(DurationError::InvalidTimeRange { hours: 24, minutes: 30 })
        ));
        assert!(matches!(
            DurationValue::parse("25.00"),
            Err(DurationError::InvalidTimeRange { hours: 25, .. })
        ));
        assert!(matches!(
            DurationValue::parse("08.75"),
            Err(DurationError::InvalidTimeRange { minutes: 75, .. })
        ));
    }

    #[test]
    fn parse_rejects_malformed_strings() {
        for input in ["", "8", "abc", "123.00", "8.123", "8..5", ".30"] {
            assert!(
                matches!(
                    DurationValue::parse(input),
                    Err(DurationError::InvalidFormat { .. })
                ),
                "{:?} should be InvalidFormat",
                input
            );
        }
    }

    #[test]
    fn parse_normalizes_before_matching() {
        // Normalization keeps digits and the dot only.
        assert_eq!(to_decimal(" 08.30 ").unwrap(), dec!(8.5));
    }

    #[test]
    fn format_renders_zero_padded_hhmm() {
        assert_eq!(
            DurationValue::from_decimal(dec!(8.5)).unwrap().to_string(),
            "08.30"
        );
        assert_eq!(
            DurationValue::from_decimal(dec!(0)).unwrap().to_string(),
            "00.00"
        );
        assert_eq!(
            DurationValue::from_decimal(dec!(24)).unwrap().to_string(),
            "24.00"
        );
        // 0.08 hours scale to 4.8 minutes, rounding to 5.
        assert_eq!(
            DurationValue::from_decimal(dec!(8.08)).unwrap().to_string(),
            "08.05"
        );
    }

    #[test]
    fn from_decimal_enforces_bounds() {
        assert!(matches!(
            DurationValue::from_decimal(dec!(24.01)),
            Err(DurationError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            DurationValue::from_decimal(dec!(-0.5)),
            Err(DurationError::ValueOutOfRange { .. })
        ));
        // Rounding happens before the bound check.
        assert!(DurationValue::from_decimal(dec!(24.0009)).is_ok());
    }

    #[test]
    fn round_trip_is_stable_after_canonical_padding() {
        for (input, canonical) in [
            ("08.30", "08.30"),
            ("8.5", "08.05"),
            ("24.00", "24.00"),
            ("0.0", "00.00"),
            ("23.59", "23.59"),
        ] {
            let parsed = DurationValue::parse(input).unwrap();
            assert_eq!(parsed.to_string(), canonical, "round trip of {:?}", input);
        }
    }

    #[test]
    fn round_trip_from_decimal_is_within_rounding_tolerance() {
        for value in [dec!(0), dec!(0.25), dec!(7.99), dec!(8.33), dec!(16.75), dec!(24)] {
            let display = DurationValue::from_decimal(value).unwrap().to_string();
            let back = to_decimal(&display).unwrap();
            let diff = (back - value).abs();
            assert!(
                diff <= dec!(0.01),
                "{} -> {} -> {} drifted by {}",
                value,
                display,
                back,
                diff
            );
        }
    }

    // --- Editing buffer ---

    fn type_keys(field: &mut DurationField, keys: &str) {
        for c in keys.chars() {
            let key = if c == '.' { Key::Dot } else { Key::Digit(c) };
            field.press(key);
        }
    }

    #[test]
    fn typing_retains_digits_and_a_single_dot() {
        let mut field = DurationField::new();
        type_keys(&mut field, "1.2.3");
        assert_eq!(field.buffer(), "1.23");
    }

    #[test]
    fn non_numeric_keys_are_suppressed() {
        let mut field = DurationField::new();
        assert_eq!(field.press(Key::Other('x')), KeyDisposition::Suppressed);
        assert_eq!(field.press(Key::Ctrl('z')), KeyDisposition::Suppressed);
        assert_eq!(field.press(Key::Ctrl('a')), KeyDisposition::Accepted);
        assert_eq!(field.press(Key::Ctrl('v')), KeyDisposition::Accepted);
        assert_eq!(field.press(Key::Tab), KeyDisposition::Accepted);
        assert_eq!(field.press(Key::ArrowLeft), KeyDisposition::Accepted);
        assert_eq!(field.buffer(), "");
    }

    #[test]
    fn backspace_removes_the_last_character() {
        let mut field = DurationField::new();
        type_keys(&mut field, "8.3");
        field.press(Key::Backspace);
        assert_eq!(field.buffer(), "8.");
    }

    #[test]
    fn commit_pads_one_digit_segments() {
        let mut field = DurationField::new();
        type_keys(&mut field, "8.3");
        // One-digit minutes gain a trailing zero on exit.
        assert_eq!(field.commit(), "08.30");
        assert_eq!(field.buffer(), "08.30");
    }

    #[test]
    fn commit_truncates_long_segments() {
        let mut field = DurationField::new();
        type_keys(&mut field, "1.234");
        assert_eq!(field.commit(), "01.23");
    }

    #[test]
    fn commit_without_dot_appends_zero_minutes() {
        for (typed, expected) in [("8", "08.00"), ("12", "12.00"), ("12345", "12.00")] {
            let mut field = DurationField::new();
            type_keys(&mut field, typed);
            assert_eq!(field.commit(), expected, "committing {:?}", typed);
        }
    }

    #[test]
    fn commit_on_empty_buffer_is_a_no_op() {
        let mut field = DurationField::new();
        assert_eq!(field.commit(), "");
        assert_eq!(field.buffer(), "");
    }

    #[test]
    fn commit_handles_bare_dot_segments() {
        let mut field = DurationField::new();
        type_keys(&mut field, ".5");
        assert_eq!(field.commit(), "00.50");

        let mut field = DurationField::new();
        type_keys(&mut field, "8.");
        assert_eq!(field.commit(), "08.00");
    }

    #[test]
    fn prefilled_field_round_trips_through_commit() {
        let value = DurationValue::from_decimal(Decimal::from(8)).unwrap();
        let mut field = DurationField::with_value(value);
        assert_eq!(field.buffer(), "08.00");
        assert_eq!(field.commit(), "08.00");
    }
}
