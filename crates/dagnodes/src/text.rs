use dagcore::{ComputeContext, NodeError, NodeMetadata, NodeType, ParamSpec, Value, ValueType};

/// Significant digits of the default notation
const GENERAL_PRECISION: usize = 6;
/// Digits after the point in fixed and scientific notation
const FIXED_PRECISION: usize = 6;

/// Number formatting styles accepted by `ToString`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// Shortest of fixed or scientific with six significant digits, trailing
    /// zeros removed (`3.5`, `1e+20`)
    Default,
    /// Six digits after the point (`3.500000`)
    Fixed,
    /// One leading digit, six after the point, signed two-digit exponent
    /// (`3.500000e+00`)
    Scientific,
    /// Truncated to a 32-bit integer, lowercase hex, negatives in two's
    /// complement
    Hex,
}

impl NumberFormat {
    pub const OPTIONS: [&'static str; 4] = ["default", "fixed", "scientific", "hex"];

    /// Unrecognised names fall back to `Default`
    pub fn parse(name: &str) -> Self {
        match name {
            "fixed" => NumberFormat::Fixed,
            "scientific" => NumberFormat::Scientific,
            "hex" => NumberFormat::Hex,
            _ => NumberFormat::Default,
        }
    }
}

pub fn format_number(value: f64, format: NumberFormat) -> String {
    if format == NumberFormat::Hex {
        return format!("{:x}", value as i32);
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    match format {
        NumberFormat::Fixed => format!("{:.*}", FIXED_PRECISION, value),
        NumberFormat::Scientific => {
            let formatted = format!("{:.*e}", FIXED_PRECISION, value);
            let (mantissa, exponent) = split_exponent(&formatted);
            format!("{}e{}", mantissa, exponent_suffix(exponent))
        }
        NumberFormat::Default | NumberFormat::Hex => format_general(value),
    }
}

fn format_general(value: f64) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let rounded = format!("{:.*e}", GENERAL_PRECISION - 1, value);
    let (mantissa, exponent) = split_exponent(&rounded);

    if exponent < -4 || exponent >= GENERAL_PRECISION as i32 {
        format!("{}e{}", trim_fraction(mantissa), exponent_suffix(exponent))
    } else {
        let decimals = (GENERAL_PRECISION as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

/// "3.50000e-7" -> ("3.50000", -7)
fn split_exponent(formatted: &str) -> (&str, i32) {
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse().unwrap_or(0)),
        None => (formatted, 0),
    }
}

fn exponent_suffix(exponent: i32) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}{:02}", sign, exponent.unsigned_abs())
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// Number to String, parameter `format`
pub struct ToStringNode;

impl NodeType for ToStringNode {
    fn node_type(&self) -> &str {
        "ToString"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("ToString", "Converts a number to string with formatting options")
            .with_category("text")
            .with_inputs([ValueType::Number])
            .with_outputs([ValueType::String])
            .with_param(
                ParamSpec::new("format", "default", "Number formatting style")
                    .with_options(NumberFormat::OPTIONS),
            )
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        let [Value::Number(value)] = ctx.inputs else {
            return Err(NodeError::InvalidInput("ToString: invalid input".to_string()));
        };
        let format = NumberFormat::parse(ctx.string_param_or("format", "default"));
        Ok(vec![Value::String(format_number(*value, format))])
    }
}

pub struct ConcatNode;

impl NodeType for ConcatNode {
    fn node_type(&self) -> &str {
        "Concat"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Concat", "Concatenates two strings")
            .with_category("text")
            .with_inputs([ValueType::String, ValueType::String])
            .with_outputs([ValueType::String])
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        match ctx.inputs {
            [Value::String(a), Value::String(b)] => Ok(vec![Value::String(format!("{a}{b}"))]),
            _ => Err(NodeError::InvalidInput("Concat: invalid inputs".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_matches_stream_output() {
        let cases = [
            (3.5, "3.5"),
            (7.0, "7"),
            (0.1 + 0.2, "0.3"),
            (100000.0, "100000"),
            (1234567.0, "1.23457e+06"),
            (1e20, "1e+20"),
            (0.0001, "0.0001"),
            (0.00001234, "1.234e-05"),
            (-2.25, "-2.25"),
            (0.0, "0"),
        ];
        for (value, expected) in cases {
            assert_eq!(format_number(value, NumberFormat::Default), expected, "{value}");
        }
    }

    #[test]
    fn default_format_rounds_like_printf() {
        let cases = [
            (123456.5, "123456"),
            (999999.5, "1e+06"),
            (99999.95, "99999.9"),
            (0.00099999995, "0.001"),
        ];
        for (value, expected) in cases {
            assert_eq!(format_number(value, NumberFormat::Default), expected, "{value}");
        }
        assert_eq!(format_number(-42.0, NumberFormat::Scientific), "-4.200000e+01");
        assert_eq!(format_number(1e-300, NumberFormat::Scientific), "1.000000e-300");
        assert_eq!(format_number(2.0 / 3.0, NumberFormat::Fixed), "0.666667");
    }

    #[test]
    fn fixed_and_scientific() {
        assert_eq!(format_number(3.5, NumberFormat::Fixed), "3.500000");
        assert_eq!(format_number(-0.125, NumberFormat::Fixed), "-0.125000");
        assert_eq!(format_number(3.5, NumberFormat::Scientific), "3.500000e+00");
        assert_eq!(format_number(0.00012, NumberFormat::Scientific), "1.200000e-04");
        assert_eq!(format_number(1e123, NumberFormat::Scientific), "1.000000e+123");
    }

    #[test]
    fn hex_truncates_to_integer() {
        assert_eq!(format_number(255.9, NumberFormat::Hex), "ff");
        assert_eq!(format_number(16.0, NumberFormat::Hex), "10");
        assert_eq!(format_number(-1.0, NumberFormat::Hex), "ffffffff");
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(format_number(f64::NAN, NumberFormat::Default), "nan");
        assert_eq!(format_number(f64::INFINITY, NumberFormat::Fixed), "inf");
        assert_eq!(format_number(f64::NEG_INFINITY, NumberFormat::Scientific), "-inf");
    }

    #[test]
    fn unknown_format_names_fall_back_to_default() {
        assert_eq!(NumberFormat::parse("binary"), NumberFormat::Default);
        assert_eq!(NumberFormat::parse("hex"), NumberFormat::Hex);
    }
}
