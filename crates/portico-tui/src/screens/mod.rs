//! Screen registry.

pub mod columns;
pub mod resource;

use color_eyre::eyre::Result;

use portico_core::{
    Announcement, Controller, Document, Gallery, NewsItem, Role, User, Violation,
};

use self::columns::Columns;
use self::resource::ResourceScreen;
use crate::component::Component;
use crate::screen::ScreenId;

async fn screen<R: Columns>(controller: &Controller) -> Result<(ScreenId, Box<dyn Component>)> {
    let query = controller.query::<R>().await?;
    let screen = ResourceScreen::new(controller.clone(), query, controller.child_token());
    Ok((ScreenId::from(R::KIND), Box::new(screen)))
}

/// One list screen per resource, each with its own query. Requires a
/// connected controller.
pub async fn create_screens(controller: &Controller) -> Result<Vec<(ScreenId, Box<dyn Component>)>> {
    Ok(vec![
        screen::<Announcement>(controller).await?,
        screen::<Document>(controller).await?,
        screen::<Gallery>(controller).await?,
        screen::<NewsItem>(controller).await?,
        screen::<Violation>(controller).await?,
        screen::<Role>(controller).await?,
        screen::<User>(controller).await?,
    ])
}
