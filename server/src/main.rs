use std::error::Error;
use std::sync::Arc;

use warp::Filter;

use futures::future::FutureExt;
use gatepass::codes;
use gatepass::config::get_variable;
use gatepass::db::PgDb;
use gatepass::environment::Environment;
use gatepass::routes;
use gatepass::store::FsStore;
use gatepass::urls::Urls;
use log::{info, initialize_logger};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let store = Arc::new(FsStore::from_env().expect("initialize code store from environment"));

    let main_port: u16 = get_variable("GATEPASS_PORT")
        .parse()
        .expect("parse GATEPASS_PORT as u16");
    let admin_port: u16 = get_variable("GATEPASS_ADMIN_PORT")
        .parse()
        .expect("parse GATEPASS_ADMIN_PORT as u16");

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);
    let logger = Arc::new(logger);

    let encoder = Arc::new(codes::make_encoder(logger.clone()));

    info!(logger, "Creating database pool...");
    let connection_string = get_variable("GATEPASS_DB_CONNECTION_STRING");
    let pool = sqlx::Pool::connect(&connection_string)
        .await
        .expect("create database pool from GATEPASS_DB_CONNECTION_STRING");
    let db = Arc::new(PgDb::new(pool));

    let urls = Arc::new(Urls::new(get_variable("GATEPASS_BASE_URL")));

    let environment = Environment::new(logger.clone(), db, urls, store, encoder);

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate = Arc::new(move || {
        let termination_sender = termination_sender.clone();

        async move {
            termination_sender.send(()).await.unwrap();
        }
        .boxed()
    });

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let logger2 = logger.clone();

        let index_route = routes::make_index_route(environment.clone());
        let generate_code_route = routes::make_generate_code_route(environment.clone());
        let form_view_route = routes::make_form_view_route(environment.clone());
        let submit_route = routes::make_submit_route(environment.clone());
        let issue_route = routes::make_issue_route(environment.clone());
        let profile_route = routes::make_profile_route(environment.clone());
        let admin_list_route = routes::make_admin_list_route(environment.clone());
        let admin_edit_view_route = routes::make_admin_edit_view_route(environment.clone());
        let admin_edit_route = routes::make_admin_edit_route(environment.clone());
        let admin_delete_route = routes::make_admin_delete_route(environment.clone());

        let routes = index_route
            .or(generate_code_route)
            .or(form_view_route)
            .or(submit_route)
            .or(issue_route)
            .or(profile_route)
            .or(admin_list_route)
            .or(admin_edit_view_route)
            .or(admin_edit_route)
            .or(admin_delete_route)
            .recover(move |r| routes::format_rejection(logger2.clone(), r));

        let (_, main_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let routes = routes::admin::make_healthz_route(environment.clone()).or(
            routes::admin::make_termination_route(environment.clone(), terminate),
        );

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
