//! Static page content.

use crate::routes::Route;

pub const BRAND: &str = "Vanga Realestate";
pub const COPYRIGHT: &str = "© Vanga Realestate";

pub struct Testimonial {
    pub name: &'static str,
    pub text: &'static str,
}

pub struct Bio {
    pub name: &'static str,
    pub subtitle: &'static str,
    pub text: &'static str,
}

pub const HERO_HEADING: &str = "Welcome to Vanga Realestate";
pub const HERO_SUBTITLE: &str = "Melbourne-based agency empowering your real estate journey with \
personalized service and local expertise.";

pub const SERVICES_HEADING: &str = "Choose Vanga As Your Realestate Experts";
pub const SERVICES_TEXT: &str = "At Vanga Realestate, we're committed to helping you find, buy, \
and sell properties with confidence. Our team combines in-depth market knowledge with \
cutting-edge technology to simplify your real estate journey. Whether you're exploring \
neighborhoods or ready to make a move, we offer comprehensive tools to predict the value of \
your property, empowering you to make informed decisions.";

pub const TESTIMONIALS: [Testimonial; 3] = [
    Testimonial {
        name: "Gary",
        text: "They guided me through every step and provided invaluable advice. Highly recommend Vanga Realestate!",
    },
    Testimonial {
        name: "Melissa",
        text: "Vanga Realestate helped me find the perfect home in no time. Their expertise made the process easy and stress-free.",
    },
    Testimonial {
        name: "David",
        text: "Professional, reliable, and extremely knowledgeable. I couldn't have asked for a better experience!",
    },
];

pub const BIOS: [Bio; 2] = [
    Bio {
        name: "Minh Cao",
        subtitle: "Bachelor of Computer Science at Swinburne University",
        text: "Computer science student with an interest in software development, data analysis \
and emerging technologies.",
    },
    Bio {
        name: "Sean Smith",
        subtitle: "Bachelor of Computer Science at Swinburne University",
        text: "Computer science student majoring in cybersecurity, with experience in web and \
Android development, networking and AWS cloud services.",
    },
];

pub const SEARCH_HEADING: &str = "Housing Price Search";
pub const SEARCH_TEXT: &str = "Housing prices play a crucial role in the real estate market, \
influencing decisions for buyers, sellers, and investors alike. We have created a tool to help \
you predict the price of your house.";

pub const ERROR_HEADING: &str = "Oops! Something went wrong...";
pub const ERROR_TEXT: &str = "No results found for the given address.";
pub const ERROR_BACK_LINK: (&str, Route) = ("Back to Search", Route::Search);

pub fn navbar() -> String {
    let links: Vec<_> = Route::NAV_LINKS
        .iter()
        .map(|(label, route)| format!("{label} ({route})"))
        .collect();
    format!("{BRAND} | {}", links.join(" | "))
}

pub fn footer() -> String {
    let links: Vec<_> = Route::FOOTER_LINKS
        .iter()
        .map(|(label, route)| format!("{label} ({route})"))
        .collect();
    format!("{}\n{COPYRIGHT}", links.join(" | "))
}

pub fn home() -> String {
    let mut out = format!("{HERO_HEADING}\n{HERO_SUBTITLE}\n\n{SERVICES_HEADING}\n{SERVICES_TEXT}\n\nTestimonials\n");
    for t in &TESTIMONIALS {
        out.push_str(&format!("  \"{}\" - {}\n", t.text, t.name));
    }
    out.push_str(&format!("\nMake A Prediction: {}\n", Route::Search));
    out
}

pub fn about() -> String {
    let mut out = String::from("About\n");
    for bio in &BIOS {
        out.push_str(&format!("\n{}\n{}\n{}\n", bio.name, bio.subtitle, bio.text));
    }
    out
}

pub fn search_intro() -> String {
    format!("{SEARCH_HEADING}\n{SEARCH_TEXT}\n")
}

pub fn error_page() -> String {
    let (label, route) = ERROR_BACK_LINK;
    format!("{ERROR_HEADING}\n{ERROR_TEXT}\n{label}: {route}\n")
}
