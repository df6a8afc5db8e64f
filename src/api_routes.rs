use actix_web::web;
use burrow_api::{comment, community, post, site, user};

pub fn config(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .service(web::resource("/site").route(web::get().to(site::get_site)))
      .service(
        web::scope("/user")
          .route("/register", web::post().to(user::register))
          .route("/login", web::post().to(user::login))
          .route("/saved", web::get().to(user::get_saved)),
      )
      .service(
        web::scope("/community")
          .route("", web::post().to(community::create_community))
          .route("", web::get().to(community::get_community))
          .route("", web::put().to(community::edit_community))
          .route("/list", web::get().to(community::list_communities))
          .route("/delete", web::post().to(community::delete_community))
          .route("/follow", web::post().to(community::follow_community)),
      )
      .service(
        web::scope("/post")
          .route("", web::post().to(post::create_post))
          .route("", web::get().to(post::get_post))
          .route("", web::put().to(post::edit_post))
          .route("/list", web::get().to(post::list_posts))
          .route("/delete", web::post().to(post::delete_post))
          .route("/like", web::post().to(post::like_post))
          .route("/save", web::post().to(post::save_post)),
      )
      .service(
        web::scope("/comment")
          .route("", web::post().to(comment::create_comment))
          .route("", web::put().to(comment::edit_comment))
          .route("/delete", web::post().to(comment::delete_comment))
          .route("/list", web::get().to(comment::list_comments))
          .route("/like", web::post().to(comment::like_comment))
          .route("/save", web::post().to(comment::save_comment)),
      ),
  );
}
