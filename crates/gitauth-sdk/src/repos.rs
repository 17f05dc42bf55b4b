use reqwest::{Method, StatusCode};

use crate::client::GitAuthClient;
use crate::error::Result;
use crate::response;
use crate::types::{PaginationRequest, RepositoryPage, MAX_PER_PAGE};

impl GitAuthClient {
    /// List repositories visible to the authenticated identity.
    ///
    /// Unset paging fields fall back to page 1 and 30 per page. Page sizes above the provider
    /// ceiling are sent as-is; the provider decides what it returns.
    pub async fn list_repositories(
        &self,
        provider: &str,
        request: &PaginationRequest,
    ) -> Result<RepositoryPage> {
        let mut url = self.endpoint(provider, &["repos"])?;
        url.query_pairs_mut().extend_pairs(request.query_pairs());

        if request.effective_per_page() > MAX_PER_PAGE {
            log::debug!(
                "per_page {} exceeds the usual provider ceiling of {}",
                request.effective_per_page(),
                MAX_PER_PAGE
            );
        }

        let response = self.send::<()>(Method::GET, url, None).await?;
        let page: RepositoryPage = response::decode_json(response, StatusCode::OK).await?;
        log::debug!(
            "{} repositories: {} of {} on page {}",
            provider,
            page.repos.len(),
            page.total,
            request.effective_page()
        );
        Ok(page)
    }

    /// Follow pages from `request` until `total` repositories have arrived or a page comes back
    /// empty, and return them as one page.
    pub async fn list_all_repositories(
        &self,
        provider: &str,
        request: &PaginationRequest,
    ) -> Result<RepositoryPage> {
        let mut request = *request;
        let mut page = self.list_repositories(provider, &request).await?;
        let mut more = page.has_more(page.repos.len());
        while more {
            request = request.next_page();
            let next = self.list_repositories(provider, &request).await?;
            more = next.has_more(page.repos.len() + next.repos.len());
            page.total = next.total;
            page.repos.extend(next.repos);
        }
        Ok(page)
    }
}
