//! Fixed presentation data fed to the templates alongside the database rows.

use serde::Serialize;

pub const BRAND: &str = "Escape.";

#[derive(Serialize, Clone, Copy)]
pub struct NavLink {
    pub label: &'static str,
    pub url: &'static str,
}

pub const NAV: [NavLink; 4] = [
    NavLink { label: "HOME", url: "/" },
    NavLink { label: "CATEGORIES", url: "/#categories" },
    NavLink { label: "ABOUT", url: "/#about" },
    NavLink { label: "CONTACT", url: "/#contact" },
];

pub const THEMES: [&str; 6] = [
    "Nature",
    "Photography",
    "Relaxation",
    "Vacation",
    "Travel",
    "Adventure",
];

#[derive(Serialize)]
pub struct Tagline {
    pub header: &'static str,
    pub text: &'static str,
    pub button: &'static str,
}

#[derive(Serialize)]
pub struct Feedback {
    pub title: &'static str,
    pub placeholder: &'static str,
    pub button: &'static str,
}

/// Header and footer shared by the public pages.
#[derive(Serialize)]
pub struct Chrome {
    pub brand: &'static str,
    pub nav: [NavLink; 4],
    pub feedback: Feedback,
}

pub fn chrome() -> Chrome {
    Chrome {
        brand: BRAND,
        nav: NAV,
        feedback: Feedback {
            title: "Stay in Touch",
            placeholder: "Enter your email address",
            button: "Submit",
        },
    }
}

pub fn tagline() -> Tagline {
    Tagline {
        header: "Let's do it together.",
        text: "We travel the world in search of stories. Come along for the ride.",
        button: "View Latest Posts",
    }
}

pub const FEATURED_TITLE: &str = "Featured Posts";
pub const RECENT_TITLE: &str = "Most Recent";

#[derive(Serialize)]
pub struct AdminForm {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub publish: &'static str,
    pub section: &'static str,
    pub theme: &'static str,
    pub post_title: &'static str,
    pub description: &'static str,
    pub author: &'static str,
    pub author_photo: &'static str,
    pub upload: &'static str,
    pub date: &'static str,
    pub hero_image: &'static str,
    pub big_note: &'static str,
    pub small_note: &'static str,
    pub featured: &'static str,
    pub content_title: &'static str,
    pub content_comment: &'static str,
    pub placeholder_avatar: &'static str,
    pub placeholder_big: &'static str,
    pub placeholder_small: &'static str,
    pub logout: &'static str,
}

pub fn admin_form() -> AdminForm {
    AdminForm {
        title: "New Post",
        subtitle: "Fill out the form below and publish your article",
        publish: "Publish",
        section: "Main Information",
        theme: "Theme",
        post_title: "Title",
        description: "Short description",
        author: "Author Name",
        author_photo: "Author Photo",
        upload: "Upload",
        date: "Publish Date",
        hero_image: "Hero image",
        big_note: "Size up to 10mb. Format: png, jpeg, gif.",
        small_note: "Size up to 5mb. Format: png, jpeg, gif.",
        featured: "Featured post",
        content_title: "Content",
        content_comment: "Post content (plain text)",
        placeholder_avatar: "/static/sources/Avatar.svg",
        placeholder_big: "/static/sources/hero_image_big.png",
        placeholder_small: "/static/sources/hero_image_small.png",
        logout: "/logout",
    }
}

#[derive(Serialize)]
pub struct LoginForm {
    pub heading: &'static str,
    pub title: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub button: &'static str,
}

pub fn login_form() -> LoginForm {
    LoginForm {
        heading: "Log in to start creating",
        title: "Log In",
        email: "Email",
        password: "Password",
        button: "Log In",
    }
}

/// Placeholder content for the admin page's live previews, shown until the
/// form is filled in.
#[derive(Serialize)]
pub struct Preview {
    pub article_label: &'static str,
    pub card_label: &'static str,
    pub frame: &'static str,
    pub background: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub author: &'static str,
    pub author_image: &'static str,
    pub date: &'static str,
}

pub fn admin_preview() -> Preview {
    Preview {
        article_label: "Article preview",
        card_label: "Post card preview",
        frame: "/static/sources/preview-browser-imitation.png",
        background: "/static/sources/preview.png",
        title: "New Post",
        subtitle: "Please, enter any description",
        author: "Enter author name",
        author_image: "/static/sources/Avatar.svg",
        date: "4/19/2023",
    }
}
