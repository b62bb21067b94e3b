use uuid::Uuid;

pub type Id = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Current time as an RFC 3339 string, the format every stored timestamp uses
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Tailwind-style badge classes shared by method and status badges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Green,
    Blue,
    Yellow,
    Red,
    Purple,
    Slate,
}

impl BadgeColor {
    pub fn css_class(&self) -> &'static str {
        match self {
            BadgeColor::Green => "bg-green-500/10 text-green-400",
            BadgeColor::Blue => "bg-blue-500/10 text-blue-400",
            BadgeColor::Yellow => "bg-yellow-500/10 text-yellow-400",
            BadgeColor::Red => "bg-red-500/10 text-red-400",
            BadgeColor::Purple => "bg-purple-500/10 text-purple-400",
            BadgeColor::Slate => "bg-slate-500/10 text-slate-400",
        }
    }
}

impl serde::Serialize for BadgeColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.css_class())
    }
}
