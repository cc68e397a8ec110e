//! services/units.rs
//! Conversión de unidades y de objetos CSS usada por las plantillas del diseñador.

use std::{fmt, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Px,
    Mm,
    Cm,
    In,
}

impl Unit {
    /// Pixeles CSS (96 dpi) por unidad.
    pub fn px_per_unit(&self) -> f64 {
        match self {
            Unit::Px => 1.0,
            Unit::Mm => 3.7795275591,
            Unit::Cm => 37.795275591,
            Unit::In => 96.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::In => "in",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "px" => Ok(Unit::Px),
            "mm" => Ok(Unit::Mm),
            "cm" => Ok(Unit::Cm),
            "in" => Ok(Unit::In),
            other => Err(anyhow!("Unidad no soportada: {}", other)),
        }
    }
}

/// Convierte `number` de `from` a `to`, pasando por pixeles.
/// Si las unidades coinciden se devuelve el valor sin redondear.
pub fn convert_uom(number: f64, from: Unit, to: Unit) -> f64 {
    if from == to {
        return number;
    }
    let px = number * from.px_per_unit();
    round3(px / to.px_per_unit())
}

/// Igual que `convert_uom` pero con la unidad de destino como sufijo ("12.5mm").
pub fn format_uom(number: f64, from: Unit, to: Unit) -> String {
    format!("{}{}", convert_uom(number, from, to), to)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Convierte un objeto de estilos (claves camelCase) en CSS inline,
/// respetando el orden de las claves.
pub fn convert_css(css: &Map<String, Value>) -> String {
    convert_css_declarations(css.iter().map(|(key, value)| {
        let raw = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        (key.as_str(), raw)
    }))
}

/// Igual que `convert_css` a partir de pares (propiedad camelCase, valor).
pub fn convert_css_declarations<K, V>(declarations: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = String::new();
    for (key, value) in declarations {
        let (key, value) = (key.as_ref(), value.as_ref());
        let rendered = if value.is_empty() && key == "backgroundColor" {
            "transparent"
        } else {
            value
        };
        out.push_str(&kebab_case(key));
        out.push(':');
        out.push_str(rendered);
        out.push_str("!important;");
    }
    out.push_str("user-select: all;");
    out
}

fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_uppercase() {
            out.push('-');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out.trim_start_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_unit_is_identity() {
        assert_eq!(convert_uom(12.34567, Unit::Mm, Unit::Mm), 12.34567);
    }

    #[test]
    fn converts_through_pixels() {
        assert_eq!(convert_uom(1.0, Unit::In, Unit::Px), 96.0);
        assert_eq!(convert_uom(25.4, Unit::Mm, Unit::In), 1.0);
        assert_eq!(convert_uom(1.0, Unit::Cm, Unit::Mm), 10.0);
        assert_eq!(format_uom(96.0, Unit::Px, Unit::In), "1in");
    }

    #[test]
    fn css_object_becomes_inline_style() {
        let css = json!({ "backgroundColor": "", "fontSize": "12px" });
        let out = convert_css(css.as_object().unwrap());
        assert_eq!(
            out,
            "background-color:transparent!important;font-size:12px!important;user-select: all;"
        );
    }

    #[test]
    fn css_keeps_declaration_order() {
        let css = json!({ "padding": "1px", "border": "0", "borderTop": "1px solid" });
        assert_eq!(
            convert_css(css.as_object().unwrap()),
            "padding:1px!important;border:0!important;border-top:1px solid!important;user-select: all;"
        );
    }

    #[test]
    fn empty_css_only_has_user_select() {
        assert_eq!(convert_css(&Map::new()), "user-select: all;");
    }
}
