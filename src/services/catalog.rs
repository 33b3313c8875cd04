use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Prefix of the callback data carried by the service keyboard buttons.
pub const SERVICE_CALLBACK_PREFIX: &str = "svc_";

/// The services a client can book, in keyboard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    EyelashExtensions,
    EyelashLamination,
    BrowLamination,
    BrowShapingAndTinting,
    HalalBrowCorrection,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Service::EyelashExtensions,
        Service::EyelashLamination,
        Service::BrowLamination,
        Service::BrowShapingAndTinting,
        Service::HalalBrowCorrection,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Human-readable name, also the value stored with the booking.
    pub fn label(&self) -> &'static str {
        match self {
            Service::EyelashExtensions => "Eyelash extensions",
            Service::EyelashLamination => "Eyelash lamination",
            Service::BrowLamination => "Eyebrow lamination",
            Service::BrowShapingAndTinting => "Eyebrow shaping and tinting",
            Service::HalalBrowCorrection => "Halal eyebrow correction",
        }
    }
}

/// One button per service, one service per row.
pub fn service_keyboard() -> InlineKeyboardMarkup {
    let rows = Service::ALL
        .iter()
        .enumerate()
        .map(|(index, service)| {
            vec![InlineKeyboardButton::callback(
                service.label(),
                format!("{SERVICE_CALLBACK_PREFIX}{index}"),
            )]
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn test_keyboard_offers_every_service_in_order() {
        let keyboard = service_keyboard();
        assert_eq!(keyboard.inline_keyboard.len(), Service::ALL.len());

        for (index, row) in keyboard.inline_keyboard.iter().enumerate() {
            assert_eq!(row.len(), 1);
            assert_eq!(row[0].text, Service::ALL[index].label());
            match &row[0].kind {
                InlineKeyboardButtonKind::CallbackData(data) => {
                    assert_eq!(data, &format!("svc_{index}"));
                }
                other => panic!("unexpected button kind: {other:?}"),
            }
        }
    }

    #[test]
    fn test_from_index_bounds() {
        assert_eq!(Service::from_index(0), Some(Service::EyelashExtensions));
        assert_eq!(Service::from_index(4), Some(Service::HalalBrowCorrection));
        assert_eq!(Service::from_index(5), None);
    }
}
