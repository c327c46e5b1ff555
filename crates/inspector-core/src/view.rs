use crate::model::{PLACEHOLDER, Scalar, UserModel};
use crate::panel::PanelAction;

pub const PANEL_TITLE: &str = "User Info Panel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Muted,
    Positive,
    Negative,
}

impl Tone {
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Plain => "white",
            Self::Muted => "#888",
            Self::Positive => "limegreen",
            Self::Negative => "crimson",
        }
    }

    fn for_text(value: &str) -> Self {
        if value == PLACEHOLDER {
            Self::Muted
        } else {
            Self::Plain
        }
    }

    fn for_flag(value: &Scalar) -> Self {
        match value.as_bool() {
            Some(true) => Self::Positive,
            Some(false) => Self::Negative,
            None => Self::Muted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    pub label: String,
    pub value: String,
    pub tone: Tone,
}

impl InfoLine {
    fn new(label: impl Into<String>, value: impl Into<String>, tone: Tone) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            tone,
        }
    }
}

/// Everything the panel renders, derived from one [`UserModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub title: &'static str,
    pub utm_source: InfoLine,
    pub url: InfoLine,
    pub t_user: InfoLine,
    pub email: InfoLine,
    pub user_id: String,
    pub features: Option<Vec<InfoLine>>,
    pub subscription: Option<Vec<InfoLine>>,
    pub n_enabled: Option<InfoLine>,
    pub actions: Vec<PanelAction>,
}

impl PanelView {
    #[must_use]
    pub fn from_model(model: &UserModel) -> Self {
        let features = model.user_features.as_ref().map(|entries| {
            entries
                .iter()
                .map(|(key, value)| {
                    let tone = match value.as_bool() {
                        Some(true) => Tone::Positive,
                        Some(false) => Tone::Negative,
                        None => Tone::Plain,
                    };
                    InfoLine::new(key.clone(), value.to_string(), tone)
                })
                .collect()
        });

        let subscription = model.active_subscription.as_ref().map(|subscription| {
            vec![
                InfoLine::new("priceID", subscription.product_id.clone(), Tone::Plain),
                InfoLine::new("startDate", subscription.start_date.clone(), Tone::Plain),
                InfoLine::new("endDate", subscription.end_date.clone(), Tone::Plain),
                InfoLine::new("status", subscription.status.clone(), Tone::Plain),
            ]
        });

        let n_enabled = model.n_enabled.as_ref().map(|flag| {
            let tone = if flag.is_truthy() {
                Tone::Positive
            } else {
                Tone::Negative
            };
            InfoLine::new("nEnabled", flag.to_string(), tone)
        });

        let mut actions = vec![
            PanelAction::Close,
            PanelAction::CopyId,
            PanelAction::ClearData,
        ];
        if !model.has_active_subscription() {
            actions.push(PanelAction::ActivateSubscription);
        }

        Self {
            title: PANEL_TITLE,
            utm_source: InfoLine::new(
                "utmSource",
                model.utm_source.clone(),
                Tone::for_text(&model.utm_source),
            ),
            url: InfoLine::new("url", model.url.clone(), Tone::for_text(&model.url)),
            t_user: InfoLine::new(
                "isTUser",
                model.is_t_user.to_string(),
                Tone::for_flag(&model.is_t_user),
            ),
            email: InfoLine::new("email", model.email.clone(), Tone::Plain),
            user_id: model.id.clone(),
            features,
            subscription,
            n_enabled,
            actions,
        }
    }

    #[must_use]
    pub fn offers(&self, action: PanelAction) -> bool {
        self.actions.contains(&action)
    }
}
