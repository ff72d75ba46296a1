//! Built-in functions available to descriptor files run from the command line.
//!
//! These are small, well-understood functions used to demonstrate and smoke-test
//! the engine: temperature conversion, great-circle distance, two validators, a
//! division that raises on zero, and a function that just prints its arguments.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::invoke::{Arguments, Exception};
use crate::registry::FunctionRegistry;
use crate::value::Value;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

static IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
    )
    .unwrap()
});

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").unwrap());

/// Registers every built-in with the given registry.
pub fn register_builtins(registry: &mut FunctionRegistry) {
    registry.register("celsius_to_fahrenheit", celsius_to_fahrenheit);
    registry.register("convert_celsius_to_fahrenheit", celsius_to_fahrenheit);
    registry.register("calculate_distance", calculate_distance);
    registry.register("validate_ip_address", validate_ip_address);
    registry.register("validate_email", validate_email);
    registry.register("divide", divide);
    registry.register("print_arguments", print_arguments);
}

pub fn celsius_to_fahrenheit(args: &Arguments) -> Result<Value, Exception> {
    let celsius = args.float("celsius")?;
    Ok(Value::Float(celsius * 9.0 / 5.0 + 32.0))
}

/// Haversine distance in kilometres between two latitude/longitude points.
pub fn calculate_distance(args: &Arguments) -> Result<Value, Exception> {
    let lat1 = args.float("lat1")?.to_radians();
    let lon1 = args.float("lon1")?.to_radians();
    let lat2 = args.float("lat2")?.to_radians();
    let lon2 = args.float("lon2")?.to_radians();

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    Ok(Value::Float(EARTH_RADIUS_KM * c))
}

pub fn validate_ip_address(args: &Arguments) -> Result<Value, Exception> {
    Ok(Value::Bool(IPV4.is_match(args.string("ip")?)))
}

pub fn validate_email(args: &Arguments) -> Result<Value, Exception> {
    Ok(Value::Bool(EMAIL.is_match(args.string("email")?)))
}

/// `a / b` as a float; raises `ZeroDivisionError` when `b` is zero.
pub fn divide(args: &Arguments) -> Result<Value, Exception> {
    let a = args.float("a")?;
    let b = args.float("b")?;
    if b == 0.0 {
        return Err(Exception::new("ZeroDivisionError", "division by zero"));
    }
    Ok(Value::Float(a / b))
}

/// Echoes its arguments to stderr, leaving stdout to the report.
pub fn print_arguments(args: &Arguments) -> Result<Value, Exception> {
    eprintln!("Arguments: {}", args);
    Ok(Value::Nil)
}
