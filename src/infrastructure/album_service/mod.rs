pub mod album_http_client;
