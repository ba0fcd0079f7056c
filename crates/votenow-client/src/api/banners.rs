use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::models::{Banner, NewBanner};
use crate::request::{ApiRequest, MultipartBody};

/// Winner banners under `/banners/`.
pub struct BannersApi<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> BannersApi<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub async fn list(&self) -> Result<Vec<Banner>> {
        self.dispatcher.send_json(ApiRequest::get("/banners/")).await
    }

    /// Publish a banner. Sent as `multipart/form-data` with `poll`, `title`
    /// and `image` fields.
    pub async fn create(&self, banner: &NewBanner) -> Result<Banner> {
        banner.validate()?;

        let image = &banner.image;
        let form = MultipartBody::new()
            .text("poll", banner.poll.to_string())
            .text("title", banner.title.trim())
            .file(
                "image",
                image.file_name.clone(),
                image.content_type.clone(),
                image.bytes.clone(),
            );

        self.dispatcher
            .send_json(ApiRequest::post("/banners/create/").multipart(form))
            .await
    }
}
