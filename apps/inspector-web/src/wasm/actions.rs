use super::*;

type BrowserActivation = ActivationControl<GlooTransport, ActivateButton, GlooSleeper>;

/// Per-panel state shared by the delegated click handler and the tasks it
/// spawns.
pub(super) struct ActionContext {
    user_id: String,
    actions: Vec<PanelAction>,
    chip: CopyChip,
    clear_button: ClearButton,
    activation: Option<BrowserActivation>,
}

impl ActionContext {
    pub(super) fn new(view: &PanelView, controls: PanelControls, config: &OverlayConfig) -> Self {
        let activation = controls.activate_button.map(|button| {
            ActivationControl::new(
                RemoteActivationClient::new(GlooTransport, config.activation.clone()),
                ActivateButton(button),
                GlooSleeper,
                config.activation_failure(),
            )
        });
        Self {
            user_id: view.user_id.clone(),
            actions: view.actions.clone(),
            chip: CopyChip(controls.chip_prefix),
            clear_button: ClearButton(controls.clear_button),
            activation,
        }
    }

    pub(super) fn offers(&self, action: PanelAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Prefix in front of the user id chip.
struct CopyChip(Option<HtmlElement>);

impl StatusSink<CopyFeedback> for CopyChip {
    fn show(&self, status: &CopyFeedback) {
        if let Some(prefix) = &self.0 {
            set_text(prefix, status.prefix());
        }
    }
}

struct ClearButton(Option<HtmlElement>);

impl StatusSink<ClearDataLabel> for ClearButton {
    fn show(&self, status: &ClearDataLabel) {
        if let Some(button) = &self.0 {
            set_text(button, status.text());
            set_background(button, status.background());
        }
    }
}

struct ActivateButton(HtmlElement);

impl StatusSink<ActivationState> for ActivateButton {
    fn show(&self, status: &ActivationState) {
        let button = &self.0;
        set_text(button, &status.label());
        let background = match status {
            ActivationState::Idle => ACTIVATE_IDLE_BACKGROUND,
            ActivationState::Pending => BUTTON_IDLE_BACKGROUND,
            ActivationState::Succeeded => ClearDataLabel::Cleared.background(),
            ActivationState::Failed(_) => ClearDataLabel::Failed.background(),
        };
        set_background(button, background);
        let toggled = if status.is_enabled() {
            button.remove_attribute("disabled")
        } else {
            button.set_attribute("disabled", "")
        };
        if toggled.is_err() {
            debug!("failed to toggle activation button");
        }
    }
}

/// Runs `action` on the next tick so the listener that received the click
/// is never dropped while it is still executing.
pub(super) fn dispatch(action: PanelAction, context: Rc<ActionContext>) {
    spawn_local(async move {
        match action {
            PanelAction::Close => {
                with_overlay(|overlay| overlay.close());
            }
            PanelAction::CopyId => {
                let _ = copy_with_feedback(
                    &JsClipboard,
                    &context.chip,
                    &GlooSleeper,
                    &context.user_id,
                    config().copy_feedback(),
                )
                .await;
            }
            PanelAction::ClearData => {
                let location = match current_location() {
                    Ok(location) => location,
                    Err(error) => {
                        warn!(%error, "cannot clear site data");
                        return;
                    }
                };
                let _ = run_clear_data(
                    &SiteDataReset::from_config(&config()),
                    &BrowserSiteData,
                    &location,
                    &context.clear_button,
                    &GlooSleeper,
                    &PageReload,
                )
                .await;
            }
            PanelAction::ActivateSubscription => {
                let Some(activation) = context.activation.as_ref() else {
                    return;
                };
                let hostname = match current_location() {
                    Ok(location) => location.hostname,
                    Err(error) => {
                        warn!(%error, "cannot activate subscription");
                        return;
                    }
                };
                activation.trigger(&hostname, &context.user_id).await;
            }
        }
    });
}
