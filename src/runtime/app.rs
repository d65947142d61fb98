use std::any::{type_name, TypeId};
use std::collections::HashMap;

use crate::config::Config;
use crate::program::{Layout, Page, Shared};
use crate::routing::{RouteError, RouteTemplate, Router, NOT_FOUND_ROUTE};
use crate::runtime::erased::{ErasedLayout, ErasedPage, LayoutAdapter, PageAdapter};
use crate::runtime::error::AppError;

const DEFAULT_HISTORY_LIMIT: usize = 100;

/// A fully assembled application: Shared, every layout, every page and the
/// route table that selects between them.
pub struct App<S: Shared, V> {
    pub(crate) shared: S,
    pub(crate) router: Router,
    pub(crate) layouts: HashMap<TypeId, Box<dyn ErasedLayout<S, V>>>,
    pub(crate) pages: HashMap<String, Box<dyn ErasedPage<S, V>>>,
    pub(crate) history_limit: usize,
}

impl<S: Shared, V: 'static> App<S, V> {
    pub fn builder(shared: S) -> AppBuilder<S, V> {
        AppBuilder::new(shared)
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Registers tiers and routes.
///
/// Registration errors are remembered and reported by [`AppBuilder::build`]
/// so that calls can be chained.
pub struct AppBuilder<S: Shared, V> {
    shared: S,
    router: Router,
    config: Option<Config>,
    layouts: HashMap<TypeId, Box<dyn ErasedLayout<S, V>>>,
    pages: HashMap<String, Box<dyn ErasedPage<S, V>>>,
    not_found: Option<Box<dyn ErasedPage<S, V>>>,
    history_limit: usize,
    error: Option<AppError>,
}

impl<S: Shared, V: 'static> AppBuilder<S, V> {
    pub fn new(shared: S) -> Self {
        Self {
            shared,
            router: Router::new(),
            config: None,
            layouts: HashMap::new(),
            pages: HashMap::new(),
            not_found: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            error: None,
        }
    }

    /// Apply `[app]` settings and make `[routes]` available to
    /// [`AppBuilder::configured`].
    pub fn with_config(mut self, config: Config) -> Self {
        if let Err(err) = config.validate() {
            return self.fail(err.into());
        }
        let router = std::mem::take(&mut self.router);
        match router.with_base_path(&config.app.base_path) {
            Ok(router) => self.router = router,
            Err(err) => return self.fail(err.into()),
        }
        self.history_limit = config.app.history_limit;
        self.config = Some(config);
        self
    }

    pub fn layout<L: Layout<S, V>>(mut self, layout: L) -> Self {
        let key = TypeId::of::<L>();
        if self.layouts.contains_key(&key) {
            return self.fail(AppError::DuplicateLayout {
                layout: type_name::<L>(),
            });
        }
        self.layouts.insert(key, Box::new(LayoutAdapter::new(layout)));
        self
    }

    /// Register `page` under a route parsed from `pattern`.
    pub fn route<P: Page<S, V>>(self, name: &str, pattern: &str, page: P) -> Self {
        match RouteTemplate::parse(name, pattern) {
            Ok(template) => self.page(template, page),
            Err(err) => self.fail(err.into()),
        }
    }

    /// Register `page` under the `[routes.<name>]` entry of the config.
    pub fn configured<P: Page<S, V>>(self, name: &str, page: P) -> Self {
        let template = match &self.config {
            Some(config) => config.route_template(name).map_err(AppError::from),
            None => Err(AppError::Route(RouteError::UnknownRoute {
                name: name.to_string(),
            })),
        };
        match template {
            Ok(template) => self.page(template, page),
            Err(err) => self.fail(err),
        }
    }

    pub fn page<P: Page<S, V>>(mut self, template: RouteTemplate, page: P) -> Self {
        let name = template.name().to_string();
        if name == NOT_FOUND_ROUTE {
            return self.fail(AppError::Route(RouteError::DuplicateRoute { name }));
        }
        if let Err(err) = self.router.register(template) {
            return self.fail(err.into());
        }
        self.pages.insert(name, Box::new(PageAdapter::new(page)));
        self
    }

    /// The page shown when no route matches a location.
    pub fn not_found<P: Page<S, V>>(mut self, page: P) -> Self {
        self.not_found = Some(Box::new(PageAdapter::new(page)));
        self
    }

    pub fn build(self) -> Result<App<S, V>, AppError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let not_found = self.not_found.ok_or(AppError::NotFoundPageMissing)?;

        let mut pages = self.pages;
        pages.insert(NOT_FOUND_ROUTE.to_string(), not_found);

        for page in pages.values() {
            if !self.layouts.contains_key(&page.layout_key()) {
                return Err(AppError::LayoutNotRegistered {
                    page: page.name(),
                    layout: page.layout_name(),
                });
            }
        }

        tracing::debug!(
            routes = self.router.templates().len(),
            layouts = self.layouts.len(),
            base_path = %self.router.base_path(),
            "application assembled"
        );

        Ok(App {
            shared: self.shared,
            router: self.router,
            layouts: self.layouts,
            pages,
            history_limit: self.history_limit,
        })
    }

    fn fail(mut self, err: AppError) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }
}
