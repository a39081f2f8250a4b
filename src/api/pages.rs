//! HTML for the browser-facing pages. Functional markup only.

use crate::auth::Session;

/// Shown as "active sessions" on the private page. Sessions live in client
/// cookies, so there is no real count to report.
pub const ACTIVE_SESSIONS_PLACEHOLDER: u32 = 1;

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape(title)
    )
}

fn flash_list(flashes: &[String]) -> String {
    flashes
        .iter()
        .map(|message| format!("<div class=\"alert\">{}</div>\n", escape(message)))
        .collect()
}

#[must_use]
pub fn home(session: Option<&Session>, flashes: &[String], now: &str) -> String {
    let mut nav = String::from("<a href=\"/\">Accueil</a> <a href=\"/login\">Connexion</a>");
    let status = if let Some(session) = session {
        nav.push_str(" <a href=\"/private\">Zone Privée</a> <a href=\"/logout\">Déconnexion</a>");
        format!(
            "<p class=\"status\"><strong>Bienvenue {} !</strong><br>\
             Vous êtes connecté en tant que <em>{}</em></p>",
            escape(&session.display_name),
            escape(session.role.as_str())
        )
    } else {
        "<p class=\"status\">Vous n'êtes pas connecté. \
         <a href=\"/login\">Connectez-vous</a> pour accéder à la zone privée.</p>"
            .to_string()
    };

    layout(
        "Site Web Sécurisé - Accueil",
        &format!(
            "<h1>Site Web Sécurisé</h1>\n<nav>{nav}</nav>\n{}{status}\n\
             <p class=\"updated\">Dernière mise à jour : {}</p>",
            flash_list(flashes),
            escape(now)
        ),
    )
}

/// `action` is the URL the form posts back to, so `next` survives failed attempts.
#[must_use]
pub fn login(action: &str, flashes: &[String]) -> String {
    layout(
        "Connexion",
        &format!(
            "<h1>Connexion</h1>\n{}\
             <form method=\"post\" action=\"{}\">\n\
             <label for=\"username\">Nom d'utilisateur</label>\n\
             <input type=\"text\" id=\"username\" name=\"username\" required autofocus>\n\
             <label for=\"password\">Mot de passe</label>\n\
             <input type=\"password\" id=\"password\" name=\"password\" required>\n\
             <button type=\"submit\">Se connecter</button>\n</form>\n\
             <p><a href=\"/\">← Retour à l'accueil</a></p>",
            flash_list(flashes),
            escape(action)
        ),
    )
}

#[must_use]
pub fn private(session: &Session, client_ip: &str, now: &str) -> String {
    layout(
        "Zone Privée",
        &format!(
            "<h1>Zone Privée</h1>\n\
             <h2>Accès au contenu privé autorisé</h2>\n\
             <h3>Informations de session</h3>\n<ul>\n\
             <li><strong>Utilisateur :</strong> {}</li>\n\
             <li><strong>Rôle :</strong> {}</li>\n\
             <li><strong>Nom d'utilisateur :</strong> {}</li>\n\
             <li><strong>Heure de connexion :</strong> {}</li>\n\
             <li><strong>Adresse IP :</strong> {}</li>\n</ul>\n\
             <p><span class=\"stat\">{ACTIVE_SESSIONS_PLACEHOLDER}</span> Sessions actives \
             <span class=\"stat\">{}</span> Heure actuelle</p>\n\
             <nav><a href=\"/\">Accueil</a> <a href=\"/logout\">Se déconnecter</a></nav>",
            escape(&session.display_name),
            escape(session.role.as_str()),
            escape(&session.username),
            escape(&session.login_time()),
            escape(client_ip),
            escape(now)
        ),
    )
}

#[must_use]
pub fn not_found() -> String {
    layout(
        "404 - Page non trouvée",
        "<div class=\"error\">404</div>\n<h2>Page non trouvée</h2>\n\
         <p>La page que vous cherchez n'existe pas.</p>\n<a href=\"/\">Retour à l'accueil</a>",
    )
}

/// `detail` is only passed in development mode.
#[must_use]
pub fn server_error(detail: Option<&str>) -> String {
    let detail = detail.map_or_else(String::new, |detail| {
        format!("<pre class=\"detail\">{}</pre>\n", escape(detail))
    });
    layout(
        "500 - Erreur serveur",
        &format!(
            "<div class=\"error\">500</div>\n<h2>Erreur interne du serveur</h2>\n\
             <p>Une erreur inattendue s'est produite.</p>\n{detail}<a href=\"/\">Retour à l'accueil</a>"
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn session() -> Session {
        Session {
            username: "user".to_string(),
            display_name: "<b>Utilisateur</b>".to_string(),
            role: Role::User,
            login_ip: "1.2.3.4".to_string(),
            issued_at: 1_714_564_800,
            expires_at: 1_714_568_400,
        }
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn home_reflects_authentication_state() {
        let anonymous = home(None, &[], "2024-05-01 12:00:00");
        assert!(anonymous.contains("Vous n'êtes pas connecté"));
        assert!(!anonymous.contains("/logout"));

        let session = session();
        let signed_in = home(Some(&session), &["bye".to_string()], "now");
        assert!(signed_in.contains("Bienvenue &lt;b&gt;Utilisateur&lt;/b&gt;"));
        assert!(signed_in.contains("<em>user</em>"));
        assert!(signed_in.contains("<div class=\"alert\">bye</div>"));
    }

    #[test]
    fn login_form_posts_back_to_action() {
        let page = login("/login?next=%2Fprivate", &["Oops".to_string()]);
        assert!(page.contains("action=\"/login?next=%2Fprivate\""));
        assert!(page.contains("name=\"username\""));
        assert!(page.contains("name=\"password\""));
        assert!(page.contains("Oops"));
    }

    #[test]
    fn private_page_lists_session_details() {
        let page = private(&session(), "9.9.9.9", "12:00");
        assert!(page.contains("Nom d'utilisateur :</strong> user"));
        assert!(page.contains("Adresse IP :</strong> 9.9.9.9"));
        assert!(page.contains("Rôle :</strong> user"));
        assert!(page.contains(&format!(
            "<span class=\"stat\">{ACTIVE_SESSIONS_PLACEHOLDER}</span>"
        )));
    }

    #[test]
    fn server_error_detail_is_optional() {
        assert!(!server_error(None).contains("<pre"));
        assert!(server_error(Some("boom <x>")).contains("<pre class=\"detail\">boom &lt;x&gt;</pre>"));
    }
}
