//! A storeless session from login to logout, without a web server.
//!
//! Each "request" builds a `CookieJar` from the `Cookie` header the
//! browser would send and prints the `Set-Cookie` lines the response
//! would carry. Time is simulated with a `ManualClock`.
//!
//! Run with `RUST_LOG=debug` to see refresh and re-key events.

use std::sync::Arc;

use secrecy::ExposeSecret;
use storeless::prelude::*;

const HOST: &str = "www.shop.example.com";
const BROWSER: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0";
const START: u64 = 1_700_000_000;

/// What a browser remembers between requests: the last token it was given.
#[derive(Default)]
struct Browser {
    token: Option<String>,
}

impl Browser {
    fn cookie_header(&self) -> String {
        match &self.token {
            Some(token) => format!("sid={token}"),
            None => String::new(),
        }
    }

    /// Applies the response's writes the way a browser would.
    fn receive(&mut self, jar: &CookieJar) {
        for write in jar.writes() {
            if write.is_deletion() {
                self.token = None;
            } else {
                self.token = Some(write.value.clone());
            }
        }
    }
}

/// Runs one simulated request and prints its outcome.
fn request<F>(label: &str, authority: &SessionAuthority, browser: &mut Browser, handler: F)
where
    F: FnOnce(&mut RequestSession<'_, CookieJar>) -> Result<(), StorelessError>,
{
    let client = ClientContext::new().user_agent(BROWSER).host(HOST);
    let mut jar = CookieJar::from_header(&browser.cookie_header()).with_host(HOST);

    println!("\n== {label} (t = {}) ==", authority.now() - START);
    {
        let mut session = authority.request(&client, &mut jar);
        if let Err(e) = handler(&mut session) {
            println!("   error: {e}");
        }
        let state = session.state();
        println!(
            "   phase={:?} user={:?} rejection={:?}",
            state.phase(),
            state.user_id().map(UserId::get),
            state.rejection()
        );
    }

    for header in jar.set_cookie_headers() {
        println!("   Set-Cookie: {header}");
    }
    browser.receive(&jar);
}

fn config(current: &str, previous: Option<&str>) -> Result<SessionConfig, StorelessError> {
    let mut builder = SessionConfig::builder()
        .current_secret(current)
        .token_field_name("sid")
        .ephemeral_expiry_minutes(10)
        .ban(UserId(666));
    if let Some(previous) = previous {
        builder = builder.previous_secret(previous);
    }
    Ok(builder.build()?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    storeless::telemetry::init();

    let clock = Arc::new(ManualClock::new(START));
    let first_secret = generate_secret();
    let authority = SessionAuthority::new(config(first_secret.expose_secret(), None)?)
        .with_clock(clock.clone());

    let mut browser = Browser::default();

    request("anonymous visit", &authority, &mut browser, |session| {
        println!("   alive: {}", session.is_alive());
        Ok(())
    });

    request("banned login", &authority, &mut browser, |session| {
        session.create(UserId(666), false)?;
        Ok(())
    });

    request("login", &authority, &mut browser, |session| {
        session.create(UserId(42), false)?;
        Ok(())
    });

    for step in 1..=3 {
        clock.advance(120);
        request(&format!("browse #{step}"), &authority, &mut browser, |session| {
            println!("   alive: {}", session.is_alive());
            println!("   refreshed: {}", session.keep_alive()?);
            Ok(())
        });
    }

    // Restart with a new secret; the old one stays valid as `previous`.
    let second_secret = generate_secret();
    let authority = SessionAuthority::new(config(
        second_secret.expose_secret(),
        Some(first_secret.expose_secret()),
    )?)
    .with_clock(clock.clone());
    tracing::info!("rotated signing secret");

    clock.advance(5);
    request("after rotation", &authority, &mut browser, |session| {
        println!("   alive: {}", session.is_alive());
        println!(
            "   signed with previous secret: {}",
            session.state().signed_with_previous_secret()
        );
        println!("   re-signed: {}", session.keep_alive()?);
        Ok(())
    });

    let token_before_idle = browser.token.clone();
    clock.advance(11 * 60);
    request("after idling 11 minutes", &authority, &mut browser, |session| {
        println!("   alive: {}", session.is_alive());
        println!("   expired: {:?}", session.is_expired());
        Ok(())
    });

    request("login again", &authority, &mut browser, |session| {
        session.create(UserId(42), true)?;
        Ok(())
    });

    request("logout", &authority, &mut browser, |session| {
        session.destroy();
        Ok(())
    });

    // Many requests at once against one shared authority.
    println!("\n== concurrent requests ==");
    let authority = Arc::new(authority);
    let mut tasks = Vec::new();
    for user in 1..=8u64 {
        let authority = Arc::clone(&authority);
        let stale = token_before_idle.clone();
        tasks.push(tokio::spawn(async move {
            let client = ClientContext::new()
                .user_agent(format!("agent/{user}"))
                .host(HOST);

            let mut jar = CookieJar::new().with_host(HOST);
            let created = authority.request(&client, &mut jar).create(UserId(user), false);
            let fresh = jar.last_issued("sid").map(|write| write.value.clone());

            let mut jar = CookieJar::new();
            // Odd users replay the stale token from the idle browser.
            let presented = if user % 2 == 1 { stale } else { fresh };
            if let Some(token) = presented {
                jar.insert("sid", token);
            }
            let alive = authority.request(&client, &mut jar).is_alive();
            (user, created.is_ok(), alive)
        }));
    }
    for task in tasks {
        let (user, created, alive) = task.await?;
        println!("   user {user}: created={created} follow-up alive={alive}");
    }

    Ok(())
}
