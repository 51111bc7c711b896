//! Extraction of [`ArticleRecord`]s from efetch `PubmedArticleSet` XML.

use std::collections::BTreeSet;

use roxmltree::{Document, Node, ParsingOptions};

use super::record::{ArticleKind, ArticleRecord, Author, Grant};

/// Parses one efetch batch. Malformed XML and articles without a PMID are
/// logged and skipped; the returned set holds the PMIDs that were extracted.
pub fn extract_records(xml: &str) -> (Vec<ArticleRecord>, BTreeSet<String>) {
    let mut records = vec![];
    let mut processed = BTreeSet::new();

    if xml.trim().is_empty() {
        log::warn!("No XML data to parse.");
        return (records, processed);
    }

    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = match Document::parse_with_options(xml, options) {
        Ok(document) => document,
        Err(e) => {
            log::error!("XML parsing error: {}", e);
            return (records, processed);
        }
    };

    let articles: Vec<Node> = document
        .descendants()
        .filter(|node| node.has_tag_name("PubmedArticle") || node.has_tag_name("PubmedBookArticle"))
        .collect();

    if articles.is_empty() {
        match find_text(document.root(), &["PMID"]) {
            Some(pmid) => log::warn!("No PubmedArticle or PubmedBookArticle found for PMID: {}", pmid),
            None => log::warn!("No PubmedArticle or PubmedBookArticle found and PMID is missing."),
        }
        return (records, processed);
    }

    for article in articles {
        let record = if article.has_tag_name("PubmedArticle") {
            extract_journal_article(article)
        } else {
            extract_book_article(article)
        };

        if let Some(record) = record {
            log::debug!("Extracted data for PMID: {}", record.pmid);
            processed.insert(record.pmid.clone());
            records.push(record);
        }
    }

    (records, processed)
}

fn extract_journal_article(article: Node) -> Option<ArticleRecord> {
    let Some(pmid) = find_text(article, &["PMID"]) else {
        log::warn!("PMID not found in PubmedArticle.");
        return None;
    };
    let mut record = ArticleRecord::new(ArticleKind::Journal, pmid);

    let (doi, pmc_id) = article_ids(find_all(article, &["PubmedData", "ArticleIdList", "ArticleId"]));
    record.doi = doi.or_else(|| elocation_doi(article));
    record.pmc_id = pmc_id;

    record.title = find_text(article, &["ArticleTitle"]);

    if let Some(journal) = find(article, &["Journal"]) {
        record.journal_title = child_text(journal, "Title");
        record.journal_iso_abbreviation = child_text(journal, "ISOAbbreviation");
        record.journal_issn = find_text(journal, &["ISSN"]);
    }

    if let Some(pub_date) = find(article, &["JournalIssue", "PubDate"]) {
        set_pub_date(&mut record, pub_date);
    }

    record.volume = find_text(article, &["JournalIssue", "Volume"]);
    record.issue = find_text(article, &["JournalIssue", "Issue"]);
    record.start_page = find_text(article, &["Pagination", "StartPage"]);
    record.medline_pgn = find_text(article, &["Pagination", "MedlinePgn"]);

    extract_shared(&mut record, article);
    record.publication_types = find_all(article, &["PublicationTypeList", "PublicationType"])
        .into_iter()
        .filter_map(text_of)
        .collect();

    record.publication_status = find_text(article, &["PubmedData", "PublicationStatus"]);
    record.language = find_text(article, &["Language"]);

    Some(record)
}

fn extract_book_article(article: Node) -> Option<ArticleRecord> {
    let Some(book_document) = find(article, &["BookDocument"]) else {
        log::warn!("BookDocument not found in PubmedBookArticle.");
        return None;
    };

    let pmid = find_text(book_document, &["PMID"]).or_else(|| {
        find_all(article, &["PubmedBookData", "ArticleIdList", "ArticleId"])
            .into_iter()
            .find(|id| id.attribute("IdType") == Some("pubmed"))
            .and_then(text_of)
    });
    let Some(pmid) = pmid else {
        log::warn!("PMID not found in PubmedBookArticle.");
        return None;
    };
    let mut record = ArticleRecord::new(ArticleKind::Book, pmid);

    let mut ids = find_all(book_document, &["ArticleIdList", "ArticleId"]);
    ids.extend(find_all(article, &["PubmedBookData", "ArticleIdList", "ArticleId"]));
    let (doi, pmc_id) = article_ids(ids);
    record.doi = doi;
    record.pmc_id = pmc_id;

    record.title = find_text(book_document, &["BookTitle"]);

    if let Some(book) = find(book_document, &["Book"]) {
        if let Some(publisher) = find(book, &["Publisher"]) {
            record.journal_title = child_text(publisher, "PublisherName");
            record.journal_iso_abbreviation = child_text(publisher, "PublisherLocation");
        }
        record.journal_issn = child_text(book, "Medium");
    }

    if let Some(pub_date) = find(book_document, &["PubDate"]) {
        set_pub_date(&mut record, pub_date);
    }

    extract_shared(&mut record, book_document);
    record.publication_types = find_all(book_document, &["PublicationType"])
        .into_iter()
        .filter_map(text_of)
        .collect();

    record.publication_status =
        find(article, &["PubmedBookData"]).and_then(|data| find_text(data, &["PublicationStatus"]));
    record.language = child_text(book_document, "Language");

    Some(record)
}

/// Fields laid out the same way in journal and book citations.
fn extract_shared(record: &mut ArticleRecord, scope: Node) {
    record.authors = find_all(scope, &["AuthorList", "Author"])
        .into_iter()
        .filter_map(|author| {
            let last_name = child_text(author, "LastName")?;
            let fore_name = child_text(author, "ForeName")?;
            Some(Author {
                last_name,
                fore_name,
                initials: child_text(author, "Initials"),
                affiliations: find_all(author, &["AffiliationInfo", "Affiliation"])
                    .into_iter()
                    .filter_map(text_of)
                    .collect(),
            })
        })
        .collect();

    record.abstract_text = find_all(scope, &["Abstract", "AbstractText"])
        .into_iter()
        .map(|section| {
            let text = text_of(section).unwrap_or_default();
            match section.attribute("Label").filter(|label| !label.is_empty()) {
                Some(label) => format!("{}: {}", label, text),
                None => text,
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    record.keywords = find_all(scope, &["KeywordList", "Keyword"])
        .into_iter()
        .filter_map(text_of)
        .collect();

    record.mesh_terms = find_all(scope, &["MeshHeadingList", "MeshHeading"])
        .into_iter()
        .filter_map(|heading| {
            let descriptor = child_text(heading, "DescriptorName")?;
            Some(match child_text(heading, "QualifierName") {
                Some(qualifier) => format!("{} / {}", descriptor, qualifier),
                None => descriptor,
            })
        })
        .collect();

    record.coi_statement = find_text(scope, &["CoiStatement"]);

    record.grants = find_all(scope, &["GrantList", "Grant"])
        .into_iter()
        .map(|grant| Grant {
            grant_id: child_text(grant, "GrantID"),
            agency: child_text(grant, "Agency"),
            country: child_text(grant, "Country"),
        })
        .collect();

    record.linkout_urls = find_all(scope, &["LinkOut"])
        .into_iter()
        .flat_map(|linkout| find_all(linkout, &["Url"]))
        .filter_map(text_of)
        .collect();
}

fn set_pub_date(record: &mut ArticleRecord, pub_date: Node) {
    record.publication_year = child_text(pub_date, "Year").or_else(|| {
        // <MedlineDate>2019 Nov-Dec</MedlineDate>
        child_text(pub_date, "MedlineDate").and_then(|date| {
            let year = date.split_whitespace().next()?.to_string();
            Some(year)
        })
    });
    record.publication_month = child_text(pub_date, "Month");
    record.publication_day = child_text(pub_date, "Day");
}

/// First DOI and first PMC id, in document order.
fn article_ids(ids: Vec<Node>) -> (Option<String>, Option<String>) {
    let mut doi = None;
    let mut pmc_id = None;
    for id in ids {
        match id.attribute("IdType") {
            Some("doi") if doi.is_none() => doi = text_of(id),
            Some("pmc") if pmc_id.is_none() => pmc_id = text_of(id),
            _ => {}
        }
    }
    (doi, pmc_id)
}

fn elocation_doi(article: Node) -> Option<String> {
    find_all(article, &["ELocationID"])
        .into_iter()
        .find(|id| id.attribute("EIdType") == Some("doi"))
        .and_then(text_of)
}

/// All text below `node`, inline markup such as `<i>` or `<sup>` included.
fn text_of(node: Node) -> Option<String> {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn child_text(node: Node, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(text_of)
}

/// Every element matching `path` below `scope`: the first segment may sit at
/// any depth, each following segment is a direct child of the previous.
fn find_all<'a, 'input>(scope: Node<'a, 'input>, path: &[&str]) -> Vec<Node<'a, 'input>> {
    let Some((first, rest)) = path.split_first() else {
        return vec![];
    };

    let mut current: Vec<Node> = scope
        .descendants()
        .filter(|node| *node != scope && node.has_tag_name(*first))
        .collect();

    for tag in rest {
        current = current
            .into_iter()
            .flat_map(|node| node.children().filter(|child| child.has_tag_name(*tag)))
            .collect();
    }

    current
}

fn find<'a, 'input>(scope: Node<'a, 'input>, path: &[&str]) -> Option<Node<'a, 'input>> {
    find_all(scope, path).into_iter().next()
}

fn find_text(scope: Node, path: &[&str]) -> Option<String> {
    find(scope, path).and_then(text_of)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOURNAL_XML: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">31000001</PMID>
      <Article PubModel="Print">
        <Journal>
          <ISSN IssnType="Electronic">1234-5678</ISSN>
          <JournalIssue CitedMedium="Internet">
            <Volume>12</Volume>
            <Issue>3</Issue>
            <PubDate><Year>2021</Year><Month>Mar</Month><Day>05</Day></PubDate>
          </JournalIssue>
          <Title>Value in Health</Title>
          <ISOAbbreviation>Value Health</ISOAbbreviation>
        </Journal>
        <ArticleTitle>Cost-effectiveness of <i>metformin</i> in type 2 diabetes.</ArticleTitle>
        <Pagination><StartPage>101</StartPage><MedlinePgn>101-110</MedlinePgn></Pagination>
        <ELocationID EIdType="doi" ValidYN="Y">10.1000/eloc</ELocationID>
        <Abstract>
          <AbstractText Label="BACKGROUND">Diabetes is costly.</AbstractText>
          <AbstractText Label="METHODS">A Markov model with HbA1c<sub>c</sub> inputs.</AbstractText>
        </Abstract>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y">
            <LastName>Smith</LastName>
            <ForeName>Jane</ForeName>
            <Initials>J</Initials>
            <AffiliationInfo><Affiliation>University A</Affiliation></AffiliationInfo>
            <AffiliationInfo><Affiliation>Hospital B</Affiliation></AffiliationInfo>
          </Author>
          <Author ValidYN="Y">
            <CollectiveName>HEOR Study Group</CollectiveName>
          </Author>
        </AuthorList>
        <Language>eng</Language>
        <GrantList CompleteYN="Y">
          <Grant><GrantID>R01 123</GrantID><Agency>NIDDK NIH HHS</Agency><Country>United States</Country></Grant>
        </GrantList>
        <PublicationTypeList>
          <PublicationType UI="D016428">Journal Article</PublicationType>
          <PublicationType UI="D003160">Comparative Study</PublicationType>
        </PublicationTypeList>
      </Article>
      <MeshHeadingList>
        <MeshHeading><DescriptorName UI="D003924">Diabetes Mellitus, Type 2</DescriptorName><QualifierName UI="Q000191">economics</QualifierName></MeshHeading>
        <MeshHeading><DescriptorName UI="D008687">Metformin</DescriptorName></MeshHeading>
      </MeshHeadingList>
      <KeywordList Owner="NOTNLM"><Keyword>cost-effectiveness</Keyword><Keyword></Keyword></KeywordList>
      <CoiStatement>None declared.</CoiStatement>
    </MedlineCitation>
    <PubmedData>
      <PublicationStatus>ppublish</PublicationStatus>
      <ArticleIdList>
        <ArticleId IdType="pubmed">31000001</ArticleId>
        <ArticleId IdType="doi">10.1000/vh.2021</ArticleId>
        <ArticleId IdType="pmc">PMC7000001</ArticleId>
      </ArticleIdList>
      <ReferenceList>
        <Reference><ArticleIdList><ArticleId IdType="pmc">PMC1</ArticleId></ArticleIdList></Reference>
      </ReferenceList>
    </PubmedData>
  </PubmedArticle>
</PubmedArticleSet>"#;

    const BOOK_XML: &str = r#"<PubmedArticleSet>
  <PubmedBookArticle>
    <BookDocument>
      <PMID Version="1">20301295</PMID>
      <ArticleIdList><ArticleId IdType="bookaccession">NBK1116</ArticleId></ArticleIdList>
      <Book>
        <Publisher>
          <PublisherName>University of Washington, Seattle</PublisherName>
          <PublisherLocation>Seattle (WA)</PublisherLocation>
        </Publisher>
        <BookTitle book="gene">GeneReviews</BookTitle>
        <PubDate><Year>1993</Year></PubDate>
        <Medium>Internet</Medium>
      </Book>
      <Language>eng</Language>
      <AuthorList Type="authors">
        <Author><LastName>Adam</LastName><ForeName>Margaret P</ForeName><Initials>MP</Initials></Author>
      </AuthorList>
      <PublicationType UI="D016454">Review</PublicationType>
      <Abstract><AbstractText>Overview text.</AbstractText></Abstract>
    </BookDocument>
    <PubmedBookData>
      <PublicationStatus>ppublish</PublicationStatus>
      <ArticleIdList><ArticleId IdType="pubmed">20301295</ArticleId></ArticleIdList>
    </PubmedBookData>
  </PubmedBookArticle>
</PubmedArticleSet>"#;

    #[test]
    fn test_journal_article_fields() {
        let (records, pmids) = extract_records(JOURNAL_XML);
        assert_eq!(records.len(), 1);
        assert!(pmids.contains("31000001"));

        let record = &records[0];
        assert_eq!(record.kind, ArticleKind::Journal);
        assert_eq!(record.doi.as_deref(), Some("10.1000/vh.2021"));
        assert_eq!(record.pmc_id.as_deref(), Some("PMC7000001"));
        assert_eq!(
            record.title.as_deref(),
            Some("Cost-effectiveness of metformin in type 2 diabetes.")
        );
        assert_eq!(record.journal_title.as_deref(), Some("Value in Health"));
        assert_eq!(record.journal_iso_abbreviation.as_deref(), Some("Value Health"));
        assert_eq!(record.journal_issn.as_deref(), Some("1234-5678"));
        assert_eq!(record.publication_year.as_deref(), Some("2021"));
        assert_eq!(record.publication_month.as_deref(), Some("Mar"));
        assert_eq!(record.publication_day.as_deref(), Some("05"));
        assert_eq!(record.volume.as_deref(), Some("12"));
        assert_eq!(record.issue.as_deref(), Some("3"));
        assert_eq!(record.start_page.as_deref(), Some("101"));
        assert_eq!(record.medline_pgn.as_deref(), Some("101-110"));
        assert_eq!(record.language.as_deref(), Some("eng"));
        assert_eq!(record.publication_status.as_deref(), Some("ppublish"));
        assert_eq!(record.coi_statement.as_deref(), Some("None declared."));
    }

    #[test]
    fn test_journal_article_lists() {
        let (records, _) = extract_records(JOURNAL_XML);
        let record = &records[0];

        assert_eq!(record.authors.len(), 1, "collective authors are skipped");
        assert_eq!(record.authors[0].last_name, "Smith");
        assert_eq!(record.authors[0].initials.as_deref(), Some("J"));
        assert_eq!(record.authors[0].affiliations, vec!["University A", "Hospital B"]);

        assert_eq!(
            record.abstract_text,
            "BACKGROUND: Diabetes is costly.\nMETHODS: A Markov model with HbA1cc inputs."
        );
        assert_eq!(record.keywords, vec!["cost-effectiveness"]);
        assert_eq!(
            record.mesh_terms,
            vec!["Diabetes Mellitus, Type 2 / economics", "Metformin"]
        );
        assert_eq!(record.publication_types, vec!["Journal Article", "Comparative Study"]);
        assert_eq!(record.grants.len(), 1);
        assert_eq!(record.grants[0].agency.as_deref(), Some("NIDDK NIH HHS"));
        assert!(record.linkout_urls.is_empty());
    }

    #[test]
    fn test_book_article_fields() {
        let (records, pmids) = extract_records(BOOK_XML);
        assert_eq!(records.len(), 1);
        assert!(pmids.contains("20301295"));

        let record = &records[0];
        assert_eq!(record.kind, ArticleKind::Book);
        assert_eq!(record.title.as_deref(), Some("GeneReviews"));
        assert_eq!(
            record.journal_title.as_deref(),
            Some("University of Washington, Seattle")
        );
        assert_eq!(record.journal_iso_abbreviation.as_deref(), Some("Seattle (WA)"));
        assert_eq!(record.journal_issn.as_deref(), Some("Internet"));
        assert_eq!(record.publication_year.as_deref(), Some("1993"));
        assert_eq!(record.volume, None);
        assert_eq!(record.authors[0].fore_name, "Margaret P");
        assert_eq!(record.publication_types, vec!["Review"]);
        assert_eq!(record.abstract_text, "Overview text.");
        assert_eq!(record.publication_status.as_deref(), Some("ppublish"));
        assert_eq!(record.language.as_deref(), Some("eng"));
        assert_eq!(record.full_text_url(), None);
    }

    #[test]
    fn test_doctype_is_accepted() {
        let xml = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>7</PMID></MedlineCitation></PubmedArticle></PubmedArticleSet>"#;
        let (records, _) = extract_records(xml);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pmid, "7");
    }

    #[test]
    fn test_article_without_pmid_is_skipped() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation><Article/></MedlineCitation></PubmedArticle></PubmedArticleSet>";
        let (records, pmids) = extract_records(xml);
        assert!(records.is_empty());
        assert!(pmids.is_empty());
    }

    #[test]
    fn test_malformed_and_empty_xml() {
        assert!(extract_records("").0.is_empty());
        assert!(extract_records("<PubmedArticleSet><PubmedArticle>").0.is_empty());
        assert!(extract_records("<eFetchResult><ERROR>ID list is empty!</ERROR></eFetchResult>").0.is_empty());
    }

    #[test]
    fn test_medline_date_year_and_elocation_doi() {
        let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
            <PMID>5</PMID>
            <Article>
              <Journal><JournalIssue><PubDate><MedlineDate>2019 Nov-Dec</MedlineDate></PubDate></JournalIssue></Journal>
              <ELocationID EIdType="doi">10.5/abc</ELocationID>
            </Article>
        </MedlineCitation></PubmedArticle></PubmedArticleSet>"#;
        let (records, _) = extract_records(xml);
        assert_eq!(records[0].publication_year.as_deref(), Some("2019"));
        assert_eq!(records[0].doi.as_deref(), Some("10.5/abc"));
        assert_eq!(records[0].pmc_id, None);
    }
}
