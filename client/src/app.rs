//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::top_bar::TopBar;
use crate::config::ClientConfig;
use crate::net::session;
use crate::net::store::StoreClient;
use crate::pages::{home::HomePage, login::LoginPage, my_bricks::MyBricksPage, wall::WallPage};
use crate::payment::ExternalSigner;
use crate::state::auth::AuthState;

/// Root application component.
///
/// Reads the build-time configuration; without it the app only explains
/// what is missing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    match ClientConfig::from_env() {
        Ok(config) => view! { <ConfiguredApp config=config /> }.into_any(),
        Err(e) => {
            log::error!("configuration error: {e}");
            view! {
                <Title text="Brick Wall" />
                <div class="config-error">
                    <h1>"The wall is not configured"</h1>
                    <p>{e.to_string()}</p>
                </div>
            }
            .into_any()
        }
    }
}

/// Provides shared contexts and sets up client-side routing.
#[component]
fn ConfiguredApp(config: ClientConfig) -> impl IntoView {
    let store = StoreClient::new(&config);
    let auth = RwSignal::new(AuthState::resolving());
    let wallet = RwSignal::new(ExternalSigner::default());

    provide_context(config);
    provide_context(store.clone());
    provide_context(auth);
    provide_context(wallet);

    leptos::task::spawn_local(async move {
        let restored = session::restore(&store).await;
        auth.set(restored.map_or_else(AuthState::default, |(session, user)| AuthState::signed_in(session, user)));
    });

    view! {
        <Title text="The Internet Brick Wall" />

        <Router>
            <TopBar />
            <main class="app-main">
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=StaticSegment("") view=HomePage />
                    <Route path=StaticSegment("wall") view=WallPage />
                    <Route path=StaticSegment("my-bricks") view=MyBricksPage />
                    <Route path=StaticSegment("login") view=LoginPage />
                </Routes>
            </main>
        </Router>
    }
}
