//! Connection style defaults and resolution.

use crate::model::{ArrowType, Connection, ConnectionStyle, ConnectionType, StrokeStyle, StyleOverride};

/// Default visual style for a connection type.
pub fn default_style(kind: ConnectionType) -> ConnectionStyle {
    let (color, stroke_width, stroke, arrow, animated) = match kind {
        ConnectionType::Flow => ("hsl(var(--primary))", 2.0, StrokeStyle::Solid, ArrowType::Arrow, true),
        ConnectionType::Dependency => (
            "hsl(var(--destructive))",
            2.0,
            StrokeStyle::Dashed,
            ArrowType::Arrow,
            false,
        ),
        ConnectionType::Association => (
            "hsl(var(--muted-foreground))",
            1.5,
            StrokeStyle::Solid,
            ArrowType::None,
            false,
        ),
        ConnectionType::Inheritance => ("hsl(var(--chart-2))", 2.0, StrokeStyle::Solid, ArrowType::Diamond, false),
        ConnectionType::Composition => ("hsl(var(--chart-3))", 2.5, StrokeStyle::Solid, ArrowType::Diamond, false),
        ConnectionType::Aggregation => ("hsl(var(--chart-4))", 2.0, StrokeStyle::Solid, ArrowType::Diamond, false),
        ConnectionType::Communication => ("hsl(var(--chart-5))", 1.5, StrokeStyle::Dotted, ArrowType::Circle, false),
        ConnectionType::Reference => (
            "hsl(var(--muted-foreground))",
            1.0,
            StrokeStyle::Dotted,
            ArrowType::None,
            false,
        ),
    };
    ConnectionStyle {
        color: color.to_string(),
        stroke_width,
        stroke,
        arrow,
        animated,
    }
}

/// Merge `overrides` into `base`. Set override fields win.
pub fn merge_style(base: &mut ConnectionStyle, overrides: &StyleOverride) {
    if let Some(color) = &overrides.color {
        base.color = color.clone();
    }
    if let Some(w) = overrides.stroke_width {
        base.stroke_width = w;
    }
    if let Some(s) = overrides.stroke {
        base.stroke = s;
    }
    if let Some(a) = overrides.arrow {
        base.arrow = a;
    }
    if let Some(a) = overrides.animated {
        base.animated = a;
    }
}

/// Effective style of a connection: type default merged with its overrides.
pub fn resolve_style(connection: &Connection) -> ConnectionStyle {
    let mut resolved = default_style(connection.kind);
    merge_style(&mut resolved, &connection.style);
    resolved
}

/// Width of the strength halo drawn under a connection, if any.
///
/// Strength 1 draws no halo.
pub fn strength_halo_width(style: &ConnectionStyle, strength: u8) -> Option<f64> {
    (strength > 1).then(|| style.stroke_width + f64::from(strength))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ItemId;
    use pretty_assertions::assert_eq;

    #[test]
    fn override_wins_field_by_field() {
        let mut c = Connection::new(
            ItemId::intern("s_a"),
            ItemId::intern("s_b"),
            ConnectionType::Dependency,
            0,
        );
        c.style.stroke_width = Some(4.0);
        c.style.arrow = Some(ArrowType::Square);

        let style = resolve_style(&c);
        assert_eq!(
            style,
            ConnectionStyle {
                color: "hsl(var(--destructive))".into(),
                stroke_width: 4.0,
                stroke: StrokeStyle::Dashed,
                arrow: ArrowType::Square,
                animated: false,
            }
        );
    }

    #[test]
    fn no_override_yields_type_default() {
        let c = Connection::new(
            ItemId::intern("s_c"),
            ItemId::intern("s_d"),
            ConnectionType::Flow,
            0,
        );
        assert_eq!(resolve_style(&c), default_style(ConnectionType::Flow));
        assert!(resolve_style(&c).animated);
    }

    #[test]
    fn halo_only_above_unit_strength() {
        let style = default_style(ConnectionType::Association);
        assert_eq!(strength_halo_width(&style, 1), None);
        assert_eq!(strength_halo_width(&style, 3), Some(4.5));
    }
}
