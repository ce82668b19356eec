//! Initial roadmap contents.

use crate::model::{ChildCollection, Node, NodeKind};

pub const DEFAULT_TITLE: &str = "CustomGPT Expansion & Enhancement";
pub const ROOT_ID: &str = "root";

/// Minimal tree used when no document can be loaded.
pub fn empty_roadmap(title: &str) -> Node {
    let mut root = Node::with_id(ROOT_ID, title, NodeKind::Root);
    root.status = None;
    root
}

/// Sample roadmap written the first time the data file is created. Only
/// tasks carry a progress value; every grouping aggregates its children.
pub fn default_roadmap(title: &str) -> Node {
    empty_roadmap(title)
        .progress(None)
        .child(
            axis("Knowledge Retrieval Enhancement", ChildCollection::Pipelines)
                .child(
                    group("RAG Pipeline", NodeKind::Pipeline)
                        .child(phase(
                            "Knowledge Preparation Phase",
                            &[
                                "Document preprocessing and cleaning",
                                "Chunking strategies optimization",
                                "Metadata extraction and enrichment",
                                "Format standardization",
                            ],
                        ))
                        .child(phase(
                            "Knowledge Ingestion Phase",
                            &[
                                "Vector database setup and configuration",
                                "Embedding model selection and implementation",
                                "Indexing strategies",
                                "Version control for knowledge updates",
                            ],
                        ))
                        .child(phase(
                            "Pipeline-AI Connection",
                            &[
                                "Query interface development",
                                "Context window management",
                                "Retrieval mechanism configuration",
                                "Response synthesis setup",
                            ],
                        ))
                        .child(phase(
                            "AI Assistant Optimization",
                            &[
                                "Prompt engineering for RAG queries",
                                "Retrieval threshold tuning",
                                "Re-ranking mechanisms",
                                "Fallback strategies",
                            ],
                        )),
                )
                .child(group("Knowledge Graph RAG", NodeKind::Pipeline).child(phase(
                    "Knowledge Preparation Phase",
                    &[
                        "Entity extraction and recognition",
                        "Relationship mapping",
                        "Ontology design",
                        "Graph schema definition",
                    ],
                )))
                .child(group("Claude Code Knowledge Base", NodeKind::Pipeline).child(phase(
                    "Knowledge Preparation Phase",
                    &[
                        "File structure organization",
                        "Documentation format standardization",
                        "Code snippet cataloging",
                        "Sub-agent knowledge segmentation",
                    ],
                ))),
        )
        .child(
            axis("Tool Integration via MCP", ChildCollection::Components)
                .child(tasks(
                    group("MCP Server Discovery & Selection", NodeKind::Component),
                    &[
                        "Available MCP servers catalog",
                        "Capability matrix creation",
                        "Performance benchmarking",
                        "Compatibility verification",
                    ],
                ))
                .child(tasks(
                    group("MCP Client Configuration", NodeKind::Component),
                    &[
                        "Request/response patterns",
                        "Error handling protocols",
                        "Retry mechanisms",
                        "Timeout configurations",
                    ],
                )),
        )
        .child(
            axis("Custom MCP Server Development", ChildCollection::Phases).child(phase(
                "API-to-MCP Bridge Creation",
                &[
                    "API specification analysis",
                    "Endpoint mapping design",
                    "Authentication wrapper development",
                    "Rate limiting implementation",
                ],
            )),
        )
}

fn axis(title: &str, collection: ChildCollection) -> Node {
    let mut node = Node::new(title, NodeKind::Axis).progress(None);
    node.collection = Some(collection);
    node
}

fn group(title: &str, kind: NodeKind) -> Node {
    Node::new(title, kind).progress(None)
}

fn phase(title: &str, titles: &[&str]) -> Node {
    tasks(group(title, NodeKind::Phase), titles)
}

fn tasks(mut parent: Node, titles: &[&str]) -> Node {
    parent.collection = Some(ChildCollection::Tasks);
    for title in titles {
        parent.push_child(Node::new(*title, NodeKind::Task));
    }
    parent
}
