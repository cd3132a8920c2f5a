pub(crate) mod inline {
    use tbot::types::keyboard::inline::{Button, ButtonKind::CallbackData, Markup};

    pub const START_MENU: Markup = &[
        &[
            Button::new("🌬 Breathe", CallbackData("breathe")),
            Button::new("💬 Talk", CallbackData("talk")),
        ],
        &[
            Button::new("📚 Resources", CallbackData("resources")),
            Button::new("📓 Mood Journal", CallbackData("mood")),
        ],
        &[
            Button::new("🆘 Emergency", CallbackData("emergency")),
            Button::new("help", CallbackData("help")),
        ],
    ];
    pub const BREATHING: Markup = &[&[Button::new("Finish", CallbackData("finish"))]];
    pub const BREATHE_AGAIN: Markup = &[&[
        Button::new("Again", CallbackData("breathe")),
        Button::new("Got it!", CallbackData("cancel")),
    ]];
    /// Buttons for `companion::QUICK_PROMPTS`, by index.
    pub const QUICK_PROMPTS: Markup = &[
        &[
            Button::new("📚 Academic stress", CallbackData("prompt:0")),
            Button::new("😟 Anxiety & worries", CallbackData("prompt:1")),
        ],
        &[
            Button::new("💕 Relationships", CallbackData("prompt:2")),
            Button::new("🌟 Mood support", CallbackData("prompt:3")),
        ],
    ];
    pub const REPLY: Markup = &[&[
        Button::new("👍 Helpful", CallbackData("helpful")),
        Button::new("💬 More", CallbackData("more")),
    ]];
    /// One button per `journal::Mood`.
    pub const MOODS: Markup = &[&[
        Button::new("😢", CallbackData("mood:Sad")),
        Button::new("😡", CallbackData("mood:Angry")),
        Button::new("😴", CallbackData("mood:Tired")),
        Button::new("😊", CallbackData("mood:Happy")),
        Button::new("😌", CallbackData("mood:Calm")),
    ]];
    pub const EMERGENCY: Markup = &[&[
        Button::new("🌬 Deep Breathing", CallbackData("breathe")),
        Button::new("💬 Talk", CallbackData("talk")),
    ]];
    pub const GOT_IT: Markup = &[&[Button::new("Got it!", CallbackData("cancel"))]];
}
