//! Static content shown by the bot.

/// A self-help resource card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resource {
    pub(crate) title: &'static str,
    pub(crate) description: &'static str,
}

/// A helpline that can be called in a crisis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Helpline {
    pub(crate) name: &'static str,
    pub(crate) number: &'static str,
    pub(crate) hours: &'static str,
}

pub(crate) const RESOURCES: [Resource; 4] = [
    Resource {
        title: "Understanding Anxiety",
        description: "Guide to anxiety symptoms and instant relief techniques",
    },
    Resource {
        title: "Academic Pressure Relief",
        description: "Strategies for exam stress management",
    },
    Resource {
        title: "Building Resilience",
        description: "A journey of emotional strength development",
    },
    Resource {
        title: "Breaking Stigma",
        description: "Stories of mental health awareness",
    },
];

pub(crate) const WELLNESS_TIPS: [&str; 2] = [
    "Take 5 deep breaths when feeling stressed",
    "Connect with friends for 15 minutes daily",
];

pub(crate) const HELPLINES: [Helpline; 4] = [
    Helpline {
        name: "Vandrevala Foundation",
        number: "1860-266-2345",
        hours: "24/7",
    },
    Helpline {
        name: "iCall",
        number: "9152987821",
        hours: "10AM-8PM Mon-Sat",
    },
    Helpline {
        name: "SNEHA",
        number: "044-24640050",
        hours: "10AM-8PM",
    },
    Helpline {
        name: "Parivarthan",
        number: "+91-7676602602",
        hours: "1PM-10PM",
    },
];

/// Text of the resources screen.
pub(crate) fn resources_text() -> String {
    let mut text = String::from("📚 Wellness Resources\n");
    for resource in RESOURCES.iter() {
        text.push_str(&format!("\n• {}\n  {}\n", resource.title, resource.description));
    }
    text.push_str("\n🌱 Daily Wellness Tips\n");
    for tip in WELLNESS_TIPS.iter() {
        text.push_str(&format!("• {}\n", tip));
    }
    text
}

/// Text of the emergency screen.
pub(crate) fn emergency_text() -> String {
    let mut text = String::from(
        "🆘 Immediate Support\n\n\
         If you're in crisis or need urgent help, these helplines offer confidential support:\n",
    );
    for helpline in HELPLINES.iter() {
        text.push_str(&format!(
            "\n📞 {}\n  {} ({})\n",
            helpline.name, helpline.number, helpline.hours
        ));
    }
    text.push_str(
        "\nRemember, seeking help is a sign of strength. \
         You don't have to face challenges alone.",
    );
    text
}
