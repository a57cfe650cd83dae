// Parser for `swctrl poe show` output.
//
// The command prints a human-oriented table:
//
// ```text
// Total Power Limit(mW): 250000
//
// Port  OpMode  HpMode  PwrLimit  Class    PoEPwr  PwrGood  Power(W)  Voltage(V)  Current(mA)
// --------------------------------------------------------------------------------------------
// 1     Auto    Dot3at  32000     Class 4  On      Good     12.5      53.1        235.4
// ```
//
// Fields are whitespace-delimited except the class, which may span two
// tokens ("Class 4"). The parser is deliberately lenient: short rows are
// skipped, bad numeric fields zero-fill, and only a missing separator row
// or a completely empty table is fatal.

use serde::Serialize;
use tracing::debug;

use crate::error::Error;

/// Detailed PoE status for a single port.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoePortStatus {
    /// 1-based port number.
    pub port: u32,
    /// Operating mode (e.g. "Auto", "Off").
    pub op_mode: String,
    /// High-power mode (e.g. "Dot3at", "Dot3af").
    pub hp_mode: String,
    /// Power limit in milliwatts.
    pub power_limit_mw: i64,
    /// PoE class (e.g. "Class 4").
    pub class: String,
    /// PoE power flag ("On", "Off", or a transitional value).
    pub poe_power: String,
    /// Power-good flag ("Good", "Bad").
    pub power_good: String,
    /// Power draw in watts.
    pub power_watts: f64,
    /// Voltage in volts.
    pub voltage_v: f64,
    /// Current in milliamps.
    pub current_ma: f64,
}

/// Complete PoE status snapshot: budget plus ordered per-port records.
///
/// Built fresh on every status query; never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoeStatus {
    /// Total power budget in milliwatts, when the output reports one.
    pub total_power_limit_mw: Option<i64>,
    pub ports: Vec<PoePortStatus>,
}

impl PoeStatus {
    /// The record for `port`, if the snapshot contains one.
    pub fn port(&self, port: u32) -> Option<&PoePortStatus> {
        self.ports.iter().find(|p| p.port == port)
    }
}

/// Parse raw `swctrl poe show` output into a [`PoeStatus`].
pub fn parse_poe_status(output: &str) -> Result<PoeStatus, Error> {
    let lines: Vec<&str> = output.lines().collect();
    let mut status = PoeStatus::default();

    // "Total Power Limit(mW): 250000" -- parse failure leaves the total
    // unset rather than failing the whole parse.
    for line in &lines {
        if line.contains("Total Power Limit") {
            status.total_power_limit_mw = line
                .split_once(':')
                .and_then(|(_, rest)| rest.trim().parse().ok());
            break;
        }
    }

    // The data section starts after the first dashed separator row.
    let data_start = lines
        .iter()
        .position(|line| line.trim_start().starts_with("----"))
        .map(|i| i + 1)
        .ok_or_else(|| Error::MalformedOutput {
            message: "no separator row before tabular data".into(),
        })?;

    for line in &lines[data_start..] {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < 10 {
            debug!(line, "skipping short status row");
            continue;
        }

        // Missing trailing tokens zero-fill instead of failing the row.
        let tok = |i: usize| tokens.get(i).copied().unwrap_or_default();

        let mut record = PoePortStatus {
            port: tok(0).parse().unwrap_or_default(),
            op_mode: tok(1).to_owned(),
            hp_mode: tok(2).to_owned(),
            power_limit_mw: tok(3).parse().unwrap_or_default(),
            ..PoePortStatus::default()
        };

        // Two-token class names ("Class 4") shift every later field by one.
        let mut idx = 4;
        if tok(idx) == "Class" && idx + 1 < tokens.len() {
            record.class = format!("{} {}", tok(idx), tok(idx + 1));
            idx += 1;
        } else {
            record.class = tok(idx).to_owned();
        }

        record.poe_power = tok(idx + 1).to_owned();
        record.power_good = tok(idx + 2).to_owned();
        record.power_watts = tok(idx + 3).parse().unwrap_or_default();
        record.voltage_v = tok(idx + 4).parse().unwrap_or_default();
        record.current_ma = tok(idx + 5).parse().unwrap_or_default();

        status.ports.push(record);
    }

    if status.ports.is_empty() {
        return Err(Error::EmptyResult);
    }

    Ok(status)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = "\
Total Power Limit(mW): 250000

Port  OpMode  HpMode  PwrLimit  Class    PoEPwr  PwrGood  Power(W)  Voltage(V)  Current(mA)
-------------------------------------------------------------------------------------------
1     Auto    Dot3at  32000     Class 4  On      Good     12.5      53.1        235.4
2     Auto    Dot3af  15400     Class 2  Off     Bad      0.0       0.0         0.0
3     Off     Dot3af  15400     Unknown  Off     Bad      0.0       0.0         0.0
";

    #[test]
    fn parses_all_rows() {
        let status = parse_poe_status(SAMPLE).expect("parse");

        assert_eq!(status.total_power_limit_mw, Some(250_000));
        assert_eq!(status.ports.len(), 3);

        let p1 = status.port(1).expect("port 1");
        assert_eq!(p1.op_mode, "Auto");
        assert_eq!(p1.hp_mode, "Dot3at");
        assert_eq!(p1.power_limit_mw, 32_000);
        assert_eq!(p1.class, "Class 4");
        assert_eq!(p1.poe_power, "On");
        assert_eq!(p1.power_good, "Good");
        assert_eq!(p1.power_watts, 12.5);
        assert_eq!(p1.voltage_v, 53.1);
        assert_eq!(p1.current_ma, 235.4);
    }

    #[test]
    fn single_token_class_does_not_shift_fields() {
        let status = parse_poe_status(SAMPLE).expect("parse");
        let p3 = status.port(3).expect("port 3");
        assert_eq!(p3.class, "Unknown");
        assert_eq!(p3.poe_power, "Off");
        assert_eq!(p3.power_good, "Bad");
    }

    #[test]
    fn short_rows_are_skipped() {
        let output = "\
Total Power Limit(mW): 100000
----
1 Auto Dot3at 32000 Class 4 On Good 12.5 53.1 235.4
garbage row
2 Auto Dot3af 15400 Class 2 Off Bad 0.0 0.0 0.0
";
        let status = parse_poe_status(output).expect("parse");
        assert_eq!(status.ports.len(), 2);
    }

    #[test]
    fn bad_numeric_fields_zero_fill() {
        let output = "\
----
1 Auto Dot3at notanumber Class 4 On Good x y z
";
        let status = parse_poe_status(output).expect("parse");
        let p1 = status.port(1).expect("port 1");
        assert_eq!(p1.power_limit_mw, 0);
        assert_eq!(p1.power_watts, 0.0);
        assert_eq!(p1.voltage_v, 0.0);
        assert_eq!(p1.current_ma, 0.0);
    }

    #[test]
    fn unparseable_total_is_not_fatal() {
        let output = "\
Total Power Limit(mW): unknown
----
1 Auto Dot3at 32000 Class 4 On Good 12.5 53.1 235.4
";
        let status = parse_poe_status(output).expect("parse");
        assert_eq!(status.total_power_limit_mw, None);
        assert_eq!(status.ports.len(), 1);
    }

    #[test]
    fn missing_separator_is_malformed() {
        let err = parse_poe_status("no table here\njust text\n").unwrap_err();
        assert!(matches!(err, Error::MalformedOutput { .. }), "got {err:?}");
    }

    #[test]
    fn zero_rows_is_empty_result() {
        let err = parse_poe_status("header\n----\n\n").unwrap_err();
        assert!(matches!(err, Error::EmptyResult), "got {err:?}");
    }
}
