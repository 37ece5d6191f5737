use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    expires_at: Instant,
}

/// Short-lived notifications shown at the bottom centre of the window.
#[derive(Debug, Default)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>, duration: Duration) {
        self.push_at(kind, message, duration, Instant::now());
    }

    fn push_at(&mut self, kind: ToastKind, message: impl Into<String>, duration: Duration, now: Instant) {
        self.items.push(Toast {
            message: message.into(),
            kind,
            expires_at: now + duration,
        });
    }

    fn expire(&mut self, now: Instant) {
        self.items.retain(|t| t.expires_at > now);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.expire(now);
        if self.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                for toast in &self.items {
                    let fill = match toast.kind {
                        ToastKind::Success => egui::Color32::from_rgb(72, 199, 142),
                        ToastKind::Error => egui::Color32::from_rgb(241, 70, 104),
                    };
                    egui::Frame::NONE
                        .fill(fill)
                        .inner_margin(egui::Margin::symmetric(14, 8))
                        .corner_radius(egui::CornerRadius::same(6))
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(&toast.message).color(egui::Color32::WHITE));
                        });
                    ui.add_space(6.0);
                }
            });

        if let Some(next) = self.items.iter().map(|t| t.expires_at).min() {
            ctx.request_repaint_after(next.saturating_duration_since(now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire() {
        let mut toasts = Toasts::default();
        let now = Instant::now();
        toasts.push_at(ToastKind::Success, "Created csv file for a.csv", Duration::from_secs(4), now);
        toasts.push_at(ToastKind::Error, "boom", Duration::from_secs(1), now);

        toasts.expire(now + Duration::from_secs(2));
        assert_eq!(toasts.items.len(), 1);
        assert_eq!(toasts.items[0].kind, ToastKind::Success);

        toasts.expire(now + Duration::from_secs(5));
        assert!(toasts.is_empty());
    }
}
