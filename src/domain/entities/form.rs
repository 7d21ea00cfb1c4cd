use serde::Serialize;

/// Describes a form a client has to submit, returned by the GET side of form routes.
#[derive(Debug, Serialize)]
pub struct FormDescriptor {
    pub title: &'static str,
    pub method: &'static str,
    pub action: String,
    pub encoding: &'static str,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub kind: &'static str,
    pub required: bool,
}

impl FormDescriptor {
    pub fn json(title: &'static str, action: impl Into<String>) -> Self {
        FormDescriptor {
            title,
            method: "POST",
            action: action.into(),
            encoding: "application/json",
            fields: Vec::new(),
        }
    }

    pub fn multipart(title: &'static str, action: impl Into<String>) -> Self {
        FormDescriptor {
            encoding: "multipart/form-data",
            ..Self::json(title, action)
        }
    }

    pub fn field(mut self, name: &'static str, kind: &'static str, required: bool) -> Self {
        self.fields.push(FormField { name, kind, required });
        self
    }
}

pub fn register_form() -> FormDescriptor {
    FormDescriptor::json("Register", "/register")
        .field("username", "text", true)
        .field("email", "email", true)
        .field("password", "password", true)
        .field("confirm_password", "password", true)
}

pub fn login_form() -> FormDescriptor {
    FormDescriptor::json("Login", "/login")
        .field("email", "email", true)
        .field("password", "password", true)
        .field("remember", "checkbox", false)
}

pub fn upload_form() -> FormDescriptor {
    FormDescriptor::multipart("Upload Photo", "/upload")
        .field("title", "text", true)
        .field("photo", "file", true)
        .field("categories", "multi-select", false)
}

pub fn category_form() -> FormDescriptor {
    FormDescriptor::json("Create Category", "/create_category")
        .field("name", "text", true)
}
